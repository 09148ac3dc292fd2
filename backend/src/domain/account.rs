//! External accounts linked to a user profile.
//!
//! A user holds at most one account per [`AccountType`]. Each type other than
//! the free-form ones only accepts URLs on its own service's host.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::AccountId;

/// Service an account belongs to. Stored as a small integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Homepage,
    Blog,
    Twitter,
    Facebook,
    Pixiv,
    Github,
    Qiita,
    Zenn,
    Atcoder,
    Soundcloud,
    Hackthebox,
    Ctftime,
}

/// Rejections raised while validating account input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountValidationError {
    #[error("unknown account type code {code}")]
    UnknownType { code: i64 },
    #[error("account url is not a valid http(s) URL: {url}")]
    MalformedUrl { url: String },
    #[error("url {url} does not belong to a {account_type:?} account")]
    UrlMismatch {
        account_type: AccountType,
        url: String,
    },
    #[error("account display name must not be empty")]
    EmptyDisplayName,
}

impl AccountType {
    /// All known account types in code order.
    pub const ALL: [Self; 12] = [
        Self::Homepage,
        Self::Blog,
        Self::Twitter,
        Self::Facebook,
        Self::Pixiv,
        Self::Github,
        Self::Qiita,
        Self::Zenn,
        Self::Atcoder,
        Self::Soundcloud,
        Self::Hackthebox,
        Self::Ctftime,
    ];

    /// Numeric code used by persistence.
    pub fn code(self) -> i16 {
        match self {
            Self::Homepage => 0,
            Self::Blog => 1,
            Self::Twitter => 2,
            Self::Facebook => 3,
            Self::Pixiv => 4,
            Self::Github => 5,
            Self::Qiita => 6,
            Self::Zenn => 7,
            Self::Atcoder => 8,
            Self::Soundcloud => 9,
            Self::Hackthebox => 10,
            Self::Ctftime => 11,
        }
    }

    /// Decode a persisted type code.
    pub fn from_code(code: i64) -> Result<Self, AccountValidationError> {
        Self::ALL
            .into_iter()
            .find(|candidate| i64::from(candidate.code()) == code)
            .ok_or(AccountValidationError::UnknownType { code })
    }

    /// Hosts accepted for this type; `None` means any host.
    fn allowed_hosts(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Homepage | Self::Blog => None,
            Self::Twitter => Some(&["twitter.com", "x.com"]),
            Self::Facebook => Some(&["www.facebook.com", "facebook.com"]),
            Self::Pixiv => Some(&["www.pixiv.net", "pixiv.net"]),
            Self::Github => Some(&["github.com"]),
            Self::Qiita => Some(&["qiita.com"]),
            Self::Zenn => Some(&["zenn.dev"]),
            Self::Atcoder => Some(&["atcoder.jp"]),
            Self::Soundcloud => Some(&["soundcloud.com"]),
            Self::Hackthebox => Some(&["app.hackthebox.com"]),
            Self::Ctftime => Some(&["ctftime.org"]),
        }
    }

    /// Check that `raw` is an http(s) URL acceptable for this account type.
    pub fn validate_url(self, raw: &str) -> Result<(), AccountValidationError> {
        let parsed = Url::parse(raw).map_err(|_| AccountValidationError::MalformedUrl {
            url: raw.to_owned(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AccountValidationError::MalformedUrl {
                url: raw.to_owned(),
            });
        }
        let Some(hosts) = self.allowed_hosts() else {
            return Ok(());
        };
        let host_matches = parsed
            .host_str()
            .is_some_and(|host| hosts.contains(&host));
        // Service accounts must point at a profile, not the service root.
        let has_profile_path = parsed.path().trim_matches('/').len() > 0;
        if host_matches && has_profile_path {
            Ok(())
        } else {
            Err(AccountValidationError::UrlMismatch {
                account_type: self,
                url: raw.to_owned(),
            })
        }
    }
}

/// A linked external account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub account_type: AccountType,
    pub display_name: String,
    pub url: String,
    pub pr_permitted: bool,
}

/// Arguments for linking a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccountArgs {
    pub account_type: AccountType,
    pub display_name: String,
    pub url: String,
    pub pr_permitted: bool,
}

impl CreateAccountArgs {
    /// Validate field content without touching storage.
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.display_name.trim().is_empty() {
            return Err(AccountValidationError::EmptyDisplayName);
        }
        self.account_type.validate_url(&self.url)
    }
}

/// Partial update of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateAccountArgs {
    pub account_type: Option<AccountType>,
    pub display_name: Option<String>,
    pub url: Option<String>,
    pub pr_permitted: Option<bool>,
}

impl UpdateAccountArgs {
    pub fn is_empty(&self) -> bool {
        self.account_type.is_none()
            && self.display_name.is_none()
            && self.url.is_none()
            && self.pr_permitted.is_none()
    }

    /// Checks that need no stored state: a blank display name, or a type and
    /// URL supplied together that do not fit each other.
    pub fn validate_standalone(&self) -> Result<(), AccountValidationError> {
        if self
            .display_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(AccountValidationError::EmptyDisplayName);
        }
        match (self.account_type, self.url.as_deref()) {
            (Some(account_type), Some(url)) => account_type.validate_url(url),
            _ => Ok(()),
        }
    }

    /// Validate the type/URL pair that would result from applying this
    /// update to `current`.
    pub fn validate_against(&self, current: &Account) -> Result<(), AccountValidationError> {
        if self.account_type.is_none() && self.url.is_none() {
            return Ok(());
        }
        let account_type = self.account_type.unwrap_or(current.account_type);
        let url = self.url.as_deref().unwrap_or(current.url.as_str());
        account_type.validate_url(url)
    }
}
