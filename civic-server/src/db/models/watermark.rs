//! Notification watermark model
//!
//! Per-admin "last seen" markers: the highest item id the admin has viewed
//! in each dashboard section. Anything above the marker renders as a badge.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatermarkRecord {
    pub admin_id: i64,
    #[serde(default)]
    pub inspectors: i64,
    #[serde(default)]
    pub complaints: i64,
    #[serde(default)]
    pub actions: i64,
    #[serde(default)]
    pub accounts: i64,
}

impl WatermarkRecord {
    pub fn empty(admin_id: i64) -> Self {
        Self {
            admin_id,
            ..Default::default()
        }
    }

    /// Merge newer markers in; watermarks only move forward
    pub fn advance(&mut self, update: &shared::request::LastSeenUpdate) {
        if let Some(v) = update.inspectors {
            self.inspectors = self.inspectors.max(v);
        }
        if let Some(v) = update.complaints {
            self.complaints = self.complaints.max(v);
        }
        if let Some(v) = update.actions {
            self.actions = self.actions.max(v);
        }
        if let Some(v) = update.accounts {
            self.accounts = self.accounts.max(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::request::LastSeenUpdate;

    #[test]
    fn test_watermarks_only_advance() {
        let mut mark = WatermarkRecord::empty(1);
        mark.complaints = 50;

        mark.advance(&LastSeenUpdate {
            complaints: Some(40),
            actions: Some(7),
            ..Default::default()
        });

        assert_eq!(mark.complaints, 50);
        assert_eq!(mark.actions, 7);
        assert_eq!(mark.inspectors, 0);
    }
}
