//! User registration, referrals and VIP access.
//!
//! Every operation that changes the user list runs its load-modify-save cycle
//! under one async lock, so two admin actions on the same store cannot
//! interleave and lose an update.

use crate::utils::data::{StoreError, UserRecord, UserStore};
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub const DEFAULT_VIP_DAYS: u32 = 30;

/// How long an approval grants VIP access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VipDuration {
    Days(u32),
    Lifetime,
}

impl VipDuration {
    pub fn expiry_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            VipDuration::Days(days) => Some(now + Duration::days(i64::from(*days))),
            VipDuration::Lifetime => None,
        }
    }
}

impl Default for VipDuration {
    fn default() -> Self {
        VipDuration::Days(DEFAULT_VIP_DAYS)
    }
}

impl FromStr for VipDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("lifetime") {
            return Ok(VipDuration::Lifetime);
        }
        match s.parse::<u32>() {
            Ok(days) if days > 0 => Ok(VipDuration::Days(days)),
            _ => Err(format!("invalid VIP duration: {s}")),
        }
    }
}

impl fmt::Display for VipDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VipDuration::Days(days) => write!(f, "{days} days"),
            VipDuration::Lifetime => f.write_str("Lifetime"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created { credited_referrer: Option<i64> },
    Existing,
}

pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    lock: Mutex<()>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Find-or-create a user. A referrer is credited only when the user is
    /// new, exists in the store, and is not the user themself.
    pub async fn register(
        &self,
        user_id: i64,
        username: &str,
        referrer: Option<i64>,
    ) -> Result<Registration, StoreError> {
        let _guard = self.lock.lock().await;
        let mut users = self.store.load()?;

        if users.iter().any(|u| u.user_id == user_id) {
            return Ok(Registration::Existing);
        }

        users.push(UserRecord::new(user_id, username));

        let credited_referrer = referrer
            .filter(|id| *id != user_id)
            .and_then(|id| users.iter_mut().find(|u| u.user_id == id))
            .map(|referrer| {
                referrer.referrals += 1;
                referrer.user_id
            });

        self.store.save(&users)?;
        info!(
            "Registered user {} (referred by {:?})",
            user_id, credited_referrer
        );
        Ok(Registration::Created { credited_referrer })
    }

    pub async fn get(&self, user_id: i64) -> Result<Option<UserRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self
            .store
            .load()?
            .into_iter()
            .find(|u| u.user_id == user_id))
    }

    pub async fn is_vip(&self, user_id: i64, now: DateTime<Utc>) -> Result<bool, StoreError> {
        Ok(self
            .get(user_id)
            .await?
            .is_some_and(|user| user.vip_active(now)))
    }

    /// Grant VIP access. Unknown users are created as "Unknown" when
    /// `create_missing` is set, otherwise None is returned.
    pub async fn approve(
        &self,
        user_id: i64,
        duration: VipDuration,
        now: DateTime<Utc>,
        create_missing: bool,
    ) -> Result<Option<UserRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut users = self.store.load()?;

        let index = match users.iter().position(|u| u.user_id == user_id) {
            Some(index) => index,
            None if create_missing => {
                users.push(UserRecord::new(user_id, "Unknown"));
                users.len() - 1
            }
            None => return Ok(None),
        };

        let user = &mut users[index];
        user.is_vip = true;
        user.expires = duration.expiry_from(now);
        let approved = user.clone();

        self.store.save(&users)?;
        info!("Approved VIP for user {} ({})", user_id, duration);
        Ok(Some(approved))
    }

    /// Remove VIP access. Returns None for unknown users.
    pub async fn revoke(&self, user_id: i64) -> Result<Option<UserRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut users = self.store.load()?;

        let Some(user) = users.iter_mut().find(|u| u.user_id == user_id) else {
            return Ok(None);
        };
        user.is_vip = false;
        user.expires = None;
        let revoked = user.clone();

        self.store.save(&users)?;
        info!("Revoked VIP for user {}", user_id);
        Ok(Some(revoked))
    }
}
