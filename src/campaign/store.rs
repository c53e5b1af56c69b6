//! Campaign files: JSON load/save and the randomized campaign generator.
//!
//! File layout:
//!
//! ```json
//! {
//!   "program": "prog.bin",
//!   "expectedResult": 0,
//!   "expectedInstructions": 0,
//!   "injections": [[0, 12, 3], [1, 4, 7]]
//! }
//! ```

use crate::campaign::{CampaignDefinition, CampaignError, Injection};
use crate::unit::RegisterGeometry;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Number of injections in a generated campaign.
pub const DEFAULT_GENERATED_INJECTIONS: usize = 1000;

/// Parse and validate a campaign from JSON text.
pub fn parse(text: &str, geometry: &RegisterGeometry) -> Result<CampaignDefinition, CampaignError> {
    let definition: CampaignDefinition = serde_json::from_str(text)
        .map_err(|e| CampaignError::CampaignLoadFailed(e.to_string()))?;
    definition.validate(geometry)?;
    Ok(definition)
}

/// Load and validate a campaign file.
pub fn load<P: AsRef<Path>>(path: P, geometry: &RegisterGeometry) -> Result<CampaignDefinition, CampaignError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| CampaignError::CampaignLoadFailed(format!("{}: {}", path.display(), e)))?;
    let definition = parse(&text, geometry)?;
    info!(
        path = %path.display(),
        injections = definition.len(),
        calibrated = definition.is_calibrated(),
        "campaign loaded"
    );
    Ok(definition)
}

/// Render a campaign as pretty-printed JSON.
pub fn to_json(definition: &CampaignDefinition) -> Result<String, CampaignError> {
    serde_json::to_string_pretty(definition)
        .map_err(|e| CampaignError::CampaignSaveFailed(e.to_string()))
}

/// Write a campaign file, replacing any existing file.
pub fn save<P: AsRef<Path>>(path: P, definition: &CampaignDefinition) -> Result<(), CampaignError> {
    let path = path.as_ref();
    let json = to_json(definition)?;
    std::fs::write(path, json)
        .map_err(|e| CampaignError::CampaignSaveFailed(format!("{}: {}", path.display(), e)))?;
    info!(path = %path.display(), "campaign saved");
    Ok(())
}

/// Build an uncalibrated campaign with one candidate injection per early
/// cycle: `cycle = index`, register and bit drawn uniformly from `geometry`.
///
/// A geometry with no registers or zero-width registers has nothing to
/// flip and is rejected unless `count` is zero.
pub fn generate<R: Rng>(
    program: impl Into<PathBuf>,
    geometry: &RegisterGeometry,
    count: usize,
    rng: &mut R,
) -> Result<CampaignDefinition, CampaignError> {
    if count > 0 && (geometry.count == 0 || geometry.width == 0) {
        return Err(CampaignError::InvalidInjectionSpec {
            index: 0,
            register: 0,
            bit: 0,
            geometry: *geometry,
        });
    }

    let injections = (0..count)
        .map(|i| {
            Injection::new(
                i as u64,
                rng.gen_range(0..geometry.count),
                rng.gen_range(0..geometry.width),
            )
        })
        .collect();

    Ok(CampaignDefinition::new(program, injections))
}

/// File name for a campaign generated at `at`, e.g.
/// `campaign_1760781600_042.json`.
pub fn generated_file_name(at: SystemTime) -> String {
    let since_epoch = at.duration_since(UNIX_EPOCH).unwrap_or_default();
    format!(
        "campaign_{}_{:03}.json",
        since_epoch.as_secs(),
        since_epoch.subsec_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    const GEOMETRY: RegisterGeometry = RegisterGeometry { count: 32, width: 8 };

    fn sample() -> CampaignDefinition {
        CampaignDefinition {
            program_path: PathBuf::from("programs/sum.bin"),
            expected_result: 5,
            expected_instructions: 100,
            injections: vec![
                Injection::new(10, 3, 0),
                Injection::new(2, 31, 7),
                Injection::new(57, 0, 4),
            ],
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campaign.json");
        let def = sample();

        save(&path, &def).unwrap();
        let loaded = load(&path, &GEOMETRY).unwrap();

        assert_eq!(loaded, def);
    }

    #[test]
    fn test_parse_schema() {
        let text = r#"{
            "program": "a.bin",
            "expectedResult": 9,
            "expectedInstructions": 40,
            "injections": [[0, 1, 2], [3, 4, 5]]
        }"#;

        let def = parse(text, &GEOMETRY).unwrap();

        assert_eq!(def.program_path, PathBuf::from("a.bin"));
        assert_eq!(def.expected_result, 9);
        assert_eq!(def.expected_instructions, 40);
        assert_eq!(def.injections, vec![Injection::new(0, 1, 2), Injection::new(3, 4, 5)]);
    }

    #[test]
    fn test_json_field_names() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["program"], "programs/sum.bin");
        assert_eq!(value["expectedResult"], 5);
        assert_eq!(value["expectedInstructions"], 100);
        assert_eq!(value["injections"][1], serde_json::json!([2, 31, 7]));
    }

    #[test]
    fn test_malformed_json_fails() {
        let err = parse("{ not json", &GEOMETRY).unwrap_err();
        assert!(matches!(err, CampaignError::CampaignLoadFailed(_)));
    }

    #[test]
    fn test_missing_field_fails() {
        let err = parse(r#"{"program": "a.bin", "injections": []}"#, &GEOMETRY).unwrap_err();
        assert!(matches!(err, CampaignError::CampaignLoadFailed(_)));
    }

    #[test]
    fn test_out_of_range_injection_fails_at_load() {
        let text = r#"{"program": "a.bin", "expectedResult": 0,
                       "expectedInstructions": 0, "injections": [[0, 1, 8]]}"#;
        let err = parse(text, &GEOMETRY).unwrap_err();
        assert!(matches!(err, CampaignError::InvalidInjectionSpec { bit: 8, .. }));
    }

    #[test]
    fn test_missing_file_fails() {
        let err = load("/nonexistent/campaign.json", &GEOMETRY).unwrap_err();
        assert!(matches!(err, CampaignError::CampaignLoadFailed(_)));
    }

    #[test]
    fn test_save_to_missing_dir_fails() {
        let err = save("/nonexistent/dir/campaign.json", &sample()).unwrap_err();
        assert!(matches!(err, CampaignError::CampaignSaveFailed(_)));
    }

    #[test]
    fn test_generate_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let def = generate("prog.bin", &GEOMETRY, DEFAULT_GENERATED_INJECTIONS, &mut rng).unwrap();

        assert!(!def.is_calibrated());
        assert_eq!(def.expected_result, 0);
        assert_eq!(def.len(), 1000);
        for (i, injection) in def.injections.iter().enumerate() {
            assert_eq!(injection.cycle, i as u64);
        }
        assert!(def.validate(&GEOMETRY).is_ok());
    }

    #[test]
    fn test_generate_covers_geometry() {
        let mut rng = StdRng::seed_from_u64(99);
        let def = generate("prog.bin", &GEOMETRY, 5000, &mut rng).unwrap();

        let max_register = def.injections.iter().map(|i| i.register).max().unwrap();
        let max_bit = def.injections.iter().map(|i| i.bit).max().unwrap();
        assert_eq!(max_register, 31);
        assert_eq!(max_bit, 7);
    }

    #[test]
    fn test_generate_is_seed_deterministic() {
        let a = generate("p", &GEOMETRY, 50, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = generate("p", &GEOMETRY, 50, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_rejects_empty_register_file() {
        let mut rng = StdRng::seed_from_u64(3);
        let no_registers = RegisterGeometry { count: 0, width: 8 };
        let no_bits = RegisterGeometry { count: 32, width: 0 };

        assert!(matches!(
            generate("p", &no_registers, 10, &mut rng),
            Err(CampaignError::InvalidInjectionSpec { .. })
        ));
        assert!(matches!(
            generate("p", &no_bits, 10, &mut rng),
            Err(CampaignError::InvalidInjectionSpec { .. })
        ));
        assert!(generate("p", &no_bits, 0, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_generated_file_name() {
        let at = UNIX_EPOCH + Duration::from_millis(1_760_781_600_042);
        assert_eq!(generated_file_name(at), "campaign_1760781600_042.json");
    }
}
