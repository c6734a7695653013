use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use noughts_training::config::EvolutionConfig;
use serde::{Serialize, de::DeserializeOwned};

use crate::model::policy_model::PolicyModel;

/// Writes `value` as pretty-printed JSON to `path`, or to stdout if `None`.
pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_pretty(BufWriter::new(file), value)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))
        }
        None => write_pretty(io::stdout().lock(), value).context("Failed to write JSON to stdout"),
    }
}

fn write_pretty<W, T>(mut writer: W, value: &T) -> io::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()
}

fn load_json<T>(file_kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} file: {}", path.display()))
}

/// Read a training configuration from a JSON file
///
/// Fields missing from the file keep their defaults.
pub fn read_config_file<P>(path: P) -> anyhow::Result<EvolutionConfig>
where
    P: AsRef<Path>,
{
    load_json("training config", path.as_ref())
}

/// Read a trained policy model from a JSON file
pub fn read_model_file<P>(path: P) -> anyhow::Result<PolicyModel>
where
    P: AsRef<Path>,
{
    load_json("policy model", path.as_ref())
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use super::*;

    #[test]
    fn test_saved_config_reads_back() {
        let path = env::temp_dir().join(format!("noughts-config-{}.json", process::id()));
        let config = EvolutionConfig {
            generations: 7,
            seed: Some(3),
            ..EvolutionConfig::default()
        };
        save_json(&config, Some(path.as_path())).unwrap();
        let loaded = read_config_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file_names_its_kind() {
        let path = env::temp_dir().join(format!("noughts-model-{}.json", process::id()));
        fs::write(&path, "{ not json").unwrap();
        let err = read_model_file(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(err.to_string().contains("policy model"), "{err}");
    }
}
