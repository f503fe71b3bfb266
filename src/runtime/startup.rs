use std::path::{Path, PathBuf};

use tracing::warn;

use crate::store::{AnyStore, FileStore, MemoryStore, TrackStore};

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the TUI, importing any given paths first.
    Play(Vec<PathBuf>),
    Export(PathBuf),
    Import(PathBuf),
    PrintConfig,
    Help,
}

pub const USAGE: &str = "\
usage: tunebox [PATH...]          start the player, importing PATHs first
       tunebox export <FILE>      write a playlist backup
       tunebox import <FILE>      restore a playlist backup
       tunebox print-config       show the effective configuration";

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, String> {
    let args: Vec<String> = args.into_iter().collect();
    match args.first().map(String::as_str) {
        Some("export") | Some("import") => {
            let [verb, file] = args.as_slice() else {
                return Err(format!("{} takes exactly one file", args[0]));
            };
            let file = PathBuf::from(file);
            Ok(if verb == "export" {
                Command::Export(file)
            } else {
                Command::Import(file)
            })
        }
        Some("print-config") => Ok(Command::PrintConfig),
        Some("-h") | Some("--help") | Some("help") => Ok(Command::Help),
        _ => Ok(Command::Play(args.into_iter().map(PathBuf::from).collect())),
    }
}

/// Open the on-disk store, falling back to a volatile one.
pub fn open_store(data_dir: &Path) -> TrackStore<AnyStore> {
    let dir = data_dir.join("store");
    let backend = match FileStore::open(&dir) {
        Ok(store) => AnyStore::File(store),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "playlist will not be saved");
            AnyStore::Memory(MemoryStore::new())
        }
    };
    TrackStore::new(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_paths_start_the_player() {
        assert_eq!(parse_args(args(&[])), Ok(Command::Play(vec![])));
        assert_eq!(
            parse_args(args(&["a.mp3", "music"])),
            Ok(Command::Play(vec!["a.mp3".into(), "music".into()]))
        );
    }

    #[test]
    fn backup_commands_need_exactly_one_file() {
        assert_eq!(
            parse_args(args(&["export", "out.json"])),
            Ok(Command::Export("out.json".into()))
        );
        assert_eq!(
            parse_args(args(&["import", "in.json"])),
            Ok(Command::Import("in.json".into()))
        );
        assert!(parse_args(args(&["export"])).is_err());
        assert!(parse_args(args(&["import", "a", "b"])).is_err());
    }

    #[test]
    fn other_commands() {
        assert_eq!(parse_args(args(&["print-config"])), Ok(Command::PrintConfig));
        assert_eq!(parse_args(args(&["--help"])), Ok(Command::Help));
    }

    #[test]
    fn store_lives_under_the_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());
        assert!(store.save_volume(0.3));
        assert!(dir.path().join("store").is_dir());
        assert!(matches!(store.backend(), AnyStore::File(_)));
        assert_eq!(open_store(dir.path()).load_volume(), 0.3);
    }
}
