use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// 初回起動時にシードされるバージョン番号。
pub const DEFAULT_VERSION_NUMBER: &str = "1.0.0";

/// `versions` テーブルの 1 行を表すドメインモデル。
/// `active = true` の行は常に高々 1 行 (部分ユニークインデックスで保証)。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: i64,
    pub version_number: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// INSERT 用の入力。`id` とタイムスタンプはストレージ側で採番・付与される。
#[derive(Debug, Clone, PartialEq)]
pub struct NewVersion {
    pub version_number: String,
    pub active: bool,
}

/// `GET /api/lastVersion` のレスポンス。外部にはバージョン文字列だけを公開する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

impl NewVersion {
    pub fn active(version_number: impl Into<String>) -> Self {
        NewVersion {
            version_number: version_number.into(),
            active: true,
        }
    }

    pub fn inactive(version_number: impl Into<String>) -> Self {
        NewVersion {
            version_number: version_number.into(),
            active: false,
        }
    }

    /// シード行。`DEFAULT_VERSION_NUMBER` かつ `active = true`。
    pub fn initial() -> Self {
        Self::active(DEFAULT_VERSION_NUMBER)
    }
}

impl From<&Version> for VersionResponse {
    fn from(version: &Version) -> Self {
        VersionResponse {
            version: version.version_number.clone(),
        }
    }
}

impl From<Version> for VersionResponse {
    fn from(version: Version) -> Self {
        VersionResponse {
            version: version.version_number,
        }
    }
}
