use serde::Deserialize;
use std::fs;
use std::path::Path;
use tw_core::{InputState, Key};

/// Scripted keyboard input: each frame lists the keys held during it.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub keys: Vec<Key>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_inputs(&self) -> Vec<Vec<Key>> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(frame.keys.clone());
            }
        }
        out
    }

    pub fn total_frames(&self) -> usize {
        self.frames.iter().map(|f| f.repeat.max(1) as usize).sum()
    }
}

/// Feeds a replay into an [`InputState`] one frame at a time, pressing and
/// releasing keys only when the held set changes.
pub struct ReplayDriver {
    frames: Vec<Vec<Key>>,
    cursor: usize,
    held: Vec<Key>,
}

impl ReplayDriver {
    pub fn new(replay: &ReplaySequence) -> Self {
        Self {
            frames: replay.expanded_inputs(),
            cursor: 0,
            held: Vec::new(),
        }
    }

    #[allow(dead_code)]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.frames.len()
    }

    /// Apply the next frame. Once the replay is exhausted every key is
    /// released and `false` is returned.
    pub fn feed(&mut self, input: &mut InputState) -> bool {
        let Some(next) = self.frames.get(self.cursor) else {
            for key in self.held.drain(..) {
                input.key_up(key);
            }
            return false;
        };
        for key in &self.held {
            if !next.contains(key) {
                input.key_up(*key);
            }
        }
        for key in next {
            input.key_down(*key);
        }
        self.held = next.clone();
        self.cursor += 1;
        true
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "tw_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn sequence(raw: &str) -> ReplaySequence {
        serde_json::from_str(raw).expect("replay fixture parses")
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "fixed_dt": 0.016666667,
              "frames": [
                { "keys": ["Right"], "repeat": 3 },
                { "keys": ["Right", "Jump"] },
                { "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 6);
        assert_eq!(replay.total_frames(), 6);
        assert_eq!(expanded[3], vec![Key::Right, Key::Jump]);
        assert!(expanded[5].is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay should fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let path = temp_file_path("badkey");
        fs::write(&path, r#"{ "frames": [ { "keys": ["Teleport"] } ] }"#)
            .expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("unknown key should fail");
        assert!(err.contains("Failed to parse replay JSON"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn driver_presses_on_change_only() {
        let replay = sequence(
            r#"{ "frames": [
                { "keys": ["Right"], "repeat": 2 },
                { "keys": ["Right", "Jump"] },
                { "keys": [] }
            ] }"#,
        );
        let mut driver = ReplayDriver::new(&replay);
        let mut input = InputState::new();

        assert!(driver.feed(&mut input));
        assert!(input.is_just_pressed(Key::Right));
        input.end_frame();

        assert!(driver.feed(&mut input));
        assert!(input.is_held(Key::Right));
        assert!(!input.is_just_pressed(Key::Right));
        input.end_frame();

        assert!(driver.feed(&mut input));
        assert!(input.is_just_pressed(Key::Jump));
        input.end_frame();

        assert!(driver.feed(&mut input));
        assert!(input.is_just_released(Key::Right));
        assert!(!input.is_held(Key::Jump));
        assert!(driver.is_finished());
        input.end_frame();

        assert!(!driver.feed(&mut input));
    }

    #[test]
    fn exhausted_driver_releases_held_keys() {
        let replay = sequence(r#"{ "frames": [ { "keys": ["Left"] } ] }"#);
        let mut driver = ReplayDriver::new(&replay);
        let mut input = InputState::new();
        driver.feed(&mut input);
        input.end_frame();
        assert!(!driver.feed(&mut input));
        assert!(!input.is_held(Key::Left));
    }
}
