use crate::scheduler::{check_horizon, FairnessStrategy, DEFAULT_HORIZON_WEEKS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Réglages du planificateur (fichier JSON optionnel, champs tous facultatifs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotaConfig {
    /// Stratégie quand l'appelant fournit la période.
    pub period_strategy: FairnessStrategy,
    /// Stratégie quand la semaine est trouvée automatiquement.
    pub next_week_strategy: FairnessStrategy,
    pub horizon_weeks: u32,
    pub honor_legacy_unavailability: bool,
}

impl Default for RotaConfig {
    fn default() -> Self {
        Self {
            period_strategy: FairnessStrategy::LoadBalancing,
            next_week_strategy: FairnessStrategy::RecencyWeighted,
            horizon_weeks: DEFAULT_HORIZON_WEEKS,
            honor_legacy_unavailability: true,
        }
    }
}

impl RotaConfig {
    pub fn validate(&self) -> Result<()> {
        check_horizon(self.horizon_weeks).context("invalid horizon_weeks")?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: RotaConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
