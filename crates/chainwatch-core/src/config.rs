//! 추적 대상 체인 목록 설정.
//!
//! 기본값은 내장된 9개 체인이며, TOML 파일로 목록 전체를 교체할 수 있습니다.
//!
//! ```toml
//! [[chains]]
//! name = "Flow"
//! defillama_id = "flow"
//! coingecko_id = "flow"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::types::TrackedEntity;

/// 내장 체인 목록 (이름, DeFiLlama ID, CoinGecko ID).
const BUILTIN_CHAINS: [(&str, &str, &str); 9] = [
    ("Aptos", "aptos", "aptos"),
    ("Avalanche", "Avalanche", "avalanche-2"),
    ("Core DAO", "core", "coredaoorg"),
    ("Flow", "flow", "flow"),
    ("Injective", "injective", "injective-protocol"),
    ("Optimism", "optimism", "optimism"),
    ("Polygon", "polygon", "matic-network"),
    ("XRP/XRPL", "XRPL", "ripple"),
    ("Sei", "sei", "sei-network"),
];

/// 설정 파일 구조.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ChainsFile {
    chains: Vec<TrackedEntity>,
}

/// 추적 대상 체인 목록.
///
/// 설정 순서가 곧 수집 순서입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedChains {
    entities: Vec<TrackedEntity>,
}

impl TrackedChains {
    /// 체인 목록 생성 (이름 중복/빈 값 검증).
    pub fn new(entities: Vec<TrackedEntity>) -> CoreResult<Self> {
        if entities.is_empty() {
            return Err(CoreError::Config("추적할 체인이 없습니다".to_string()));
        }

        let mut seen = HashSet::new();
        for entity in &entities {
            if entity.name.trim().is_empty()
                || entity.defillama_id.trim().is_empty()
                || entity.coingecko_id.trim().is_empty()
            {
                return Err(CoreError::InvalidInput(format!(
                    "체인 설정에 빈 값이 있습니다: {:?}",
                    entity
                )));
            }
            if !seen.insert(entity.name.to_lowercase()) {
                return Err(CoreError::InvalidInput(format!(
                    "중복된 체인 이름: {}",
                    entity.name
                )));
            }
        }

        Ok(Self { entities })
    }

    /// 내장 체인 목록.
    pub fn builtin() -> Self {
        let entities = BUILTIN_CHAINS
            .iter()
            .map(|(name, llama, gecko)| TrackedEntity::new(*name, *llama, *gecko))
            .collect();
        Self { entities }
    }

    /// TOML 파일에서 로드.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let file: ChainsFile = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;

        Self::new(file.chains)
    }

    /// TOML 문자열에서 로드.
    pub fn from_toml_str(contents: &str) -> CoreResult<Self> {
        let file: ChainsFile = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Self::new(file.chains)
    }

    /// 파일 경로가 있으면 파일에서, 없으면 내장 목록 사용.
    pub fn load_or_builtin<P: AsRef<Path>>(path: Option<P>) -> CoreResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    /// 설정 순서대로 체인 목록.
    pub fn entities(&self) -> &[TrackedEntity] {
        &self.entities
    }

    /// 이름 또는 소스 식별자로 체인 조회.
    pub fn find(&self, key: &str) -> Option<&TrackedEntity> {
        self.entities.iter().find(|e| e.matches(key))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for TrackedChains {
    fn default() -> Self {
        Self::builtin()
    }
}
