use secrecy::SecretString;

/// Identity provider settings shared by every action.
#[derive(Clone)]
pub struct GlobalArgs {
    pub identity_url: String,
    pub identity_anon_key: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(identity_url: String) -> Self {
        Self {
            identity_url,
            identity_anon_key: SecretString::default(),
        }
    }

    pub fn set_anon_key(&mut self, key: SecretString) {
        self.identity_anon_key = key;
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("identity_url", &self.identity_url)
            .field("identity_anon_key", &"***")
            .finish()
    }
}
