//! Read-modify-write of the signed-in user's profile row.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::{
    identity::User,
    store::{ProfileStore, UserProfile},
};

/// Shown when the community size cannot be read.
pub const APPROXIMATE_USER_COUNT: i64 = 2400;

/// Editable profile fields as typed into the form. Empty strings clear the
/// field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct ProfileDraft {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Error updating profile. Please try again.")]
pub struct SaveFailed;

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Default profile built from the provider's user record. Not persisted.
#[must_use]
pub fn synthesize(user: &User) -> UserProfile {
    UserProfile {
        id: user.id,
        email: user.email.clone().unwrap_or_default(),
        full_name: user.metadata_str("full_name").map(str::to_string),
        username: user.metadata_str("username").map(str::to_string),
        avatar_url: user.metadata_str("avatar_url").map(str::to_string),
        is_verified: user.email_confirmed_at.is_some(),
    }
}

/// Share of optional fields filled in, rounded to the nearest percent.
#[must_use]
pub fn completion_percent(profile: &UserProfile) -> u8 {
    let filled = [&profile.full_name, &profile.username, &profile.avatar_url]
        .iter()
        .filter(|field| field.as_deref().is_some_and(|value| !value.is_empty()))
        .count();
    // round(filled / 3 * 100) without floats
    u8::try_from((filled * 200 + 3) / 6).unwrap_or(100)
}

/// `2.4K` style community size.
#[must_use]
pub fn format_user_count(count: i64) -> String {
    if count >= 1000 {
        // i64 -> f64 is exact for any realistic row count
        #[allow(clippy::cast_precision_loss)]
        let thousands = count as f64 / 1000.0;
        format!("{thousands:.1}K")
    } else {
        count.to_string()
    }
}

/// Committed profile plus an independent draft.
#[derive(Clone, Debug)]
pub struct ProfileEditor {
    committed: UserProfile,
    draft: UserProfile,
    editing: bool,
}

impl ProfileEditor {
    #[must_use]
    pub fn new(profile: UserProfile) -> Self {
        Self {
            draft: profile.clone(),
            committed: profile,
            editing: false,
        }
    }

    /// Load the stored row for `user`, falling back to [`synthesize`] when
    /// there is none or the store fails.
    pub async fn load(user: &User, store: &dyn ProfileStore) -> Self {
        let profile = match store.fetch(user.id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                debug!("No profile row yet, synthesizing");
                synthesize(user)
            }
            Err(err) => {
                error!("Failed to fetch profile: {err:#}");
                synthesize(user)
            }
        };
        Self::new(profile)
    }

    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.committed
    }

    #[must_use]
    pub fn draft(&self) -> &UserProfile {
        &self.draft
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    #[must_use]
    pub fn completion_percent(&self) -> u8 {
        completion_percent(&self.committed)
    }

    pub fn begin_edit(&mut self) {
        self.draft = self.committed.clone();
        self.editing = true;
    }

    /// Replace the editable fields of the draft. Ignored outside edit mode.
    pub fn update_draft(&mut self, draft: ProfileDraft) {
        if !self.editing {
            return;
        }
        self.draft.full_name = draft.full_name;
        self.draft.username = draft.username;
        self.draft.avatar_url = draft.avatar_url;
    }

    pub fn cancel(&mut self) {
        self.draft = self.committed.clone();
        self.editing = false;
    }

    /// Upsert the draft. The email always comes from the signed-in `user`, so
    /// an address changed at the provider replaces the stored one. On success
    /// the draft becomes the committed profile and edit mode ends; on failure
    /// edit mode and the draft are kept.
    ///
    /// # Errors
    /// Returns [`SaveFailed`] when the store rejects the write.
    pub async fn save(&mut self, user: &User, store: &dyn ProfileStore) -> Result<(), SaveFailed> {
        let row = UserProfile {
            email: user.email.clone().unwrap_or_else(|| self.draft.email.clone()),
            full_name: non_empty(self.draft.full_name.clone()),
            username: non_empty(self.draft.username.clone()),
            avatar_url: non_empty(self.draft.avatar_url.clone()),
            ..self.draft.clone()
        };
        match store.upsert(&row).await {
            Ok(()) => {
                self.draft = row.clone();
                self.committed = row;
                self.editing = false;
                Ok(())
            }
            Err(err) => {
                error!("Error updating profile: {err:#}");
                Err(SaveFailed)
            }
        }
    }
}
