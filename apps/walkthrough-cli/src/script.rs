use anyhow::Context;
use serde::Deserialize;
use std::io::{self, Write};
use std::path::Path;
use walkthrough_input::InputState;
use walkthrough_kernel::{FrameHost, FrameReport, LoopControl, Navigator};

/// A key press or release delivered just before `frame` is ticked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyEvent {
    pub frame: u64,
    pub key: String,
    #[serde(default = "default_pressed")]
    pub pressed: bool,
}

fn default_pressed() -> bool {
    true
}

/// Timed keyboard input for headless runs.
///
/// ```yaml
/// - { frame: 1, key: w }
/// - { frame: 20, key: w, pressed: false }
/// - { frame: 20, key: ArrowLeft }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct InputScript {
    events: Vec<KeyEvent>,
}

impl InputScript {
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let mut script: Self = serde_yaml::from_str(text).context("parsing input script")?;
        // Stable: events within one frame keep file order.
        script.events.sort_by_key(|e| e.frame);
        Ok(script)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading input script {}", path.display()))?;
        Self::from_yaml(&text)
    }

    /// Press `keys` before the first frame and keep them held.
    pub fn with_held<S: AsRef<str>>(mut self, keys: &[S]) -> Self {
        let mut events: Vec<KeyEvent> = keys
            .iter()
            .map(|k| KeyEvent {
                frame: 1,
                key: k.as_ref().to_string(),
                pressed: true,
            })
            .collect();
        events.append(&mut self.events);
        self.events = events;
        self
    }

    pub fn events_at(&self, frame: u64) -> impl Iterator<Item = &KeyEvent> + '_ {
        self.events.iter().filter(move |e| e.frame == frame)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    /// One JSON frame report per line.
    Json,
}

/// Frame host that replays an [`InputScript`] and writes one line per frame.
///
/// The first write error stops the loop and is returned by [`ScriptedHost::finish`].
pub struct ScriptedHost<W: Write> {
    script: InputScript,
    out: W,
    format: OutputFormat,
    error: Option<io::Error>,
}

impl<W: Write> ScriptedHost<W> {
    pub fn new(script: InputScript, out: W, format: OutputFormat) -> Self {
        Self {
            script,
            out,
            format,
            error: None,
        }
    }

    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_report(&mut self, report: &FrameReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let line = serde_json::to_string(report).map_err(io::Error::other)?;
                writeln!(self.out, "{line}")
            }
            OutputFormat::Text => writeln!(self.out, "{}", describe(report)),
        }
    }
}

impl<W: Write> FrameHost for ScriptedHost<W> {
    fn poll_input(&mut self, frame: u64, input: &mut InputState) -> LoopControl {
        if self.error.is_some() {
            return LoopControl::Stop;
        }
        for event in self.script.events_at(frame) {
            if input.handle_key(&event.key, event.pressed).is_none() {
                tracing::debug!(frame, key = %event.key, "scripted key has no binding");
            }
        }
        LoopControl::Continue
    }

    fn present(&mut self, _navigator: &Navigator, report: &FrameReport) {
        if let Err(e) = self.write_report(report) {
            tracing::error!("failed to write frame report: {e}");
            self.error = Some(e);
        }
    }
}

/// One-line human summary of a frame.
pub fn describe(report: &FrameReport) -> String {
    let p = report.pose.position;
    let mut line = format!(
        "frame {:>4}  pos=({:.3}, {:.3}, {:.3}) yaw={:.3}",
        report.frame, p.x, p.y, p.z, report.pose.yaw
    );
    if let Some(o) = &report.obstruction {
        line.push_str(&format!(
            "  blocked by {} at {:.3} (probe {:.2}, {:.2})",
            o.object.short(),
            o.distance,
            o.probe.x,
            o.probe.z
        ));
    } else if !report.committed.is_zero() {
        line.push_str(&format!(
            "  moved ({:.3}, {:.3})",
            report.committed.dx, report.committed.dz
        ));
    }
    if let Some(target) = report.target {
        line.push_str(&format!("  target={}", target.short()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkthrough_input::KeyBindings;
    use walkthrough_kernel::{NavConfig, run};
    use walkthrough_scene::demo_scene;

    fn navigator() -> (Navigator, walkthrough_scene::Scene) {
        let scene = demo_scene();
        let nav = Navigator::new(NavConfig::default(), KeyBindings::default(), scene.spawn());
        (nav, scene)
    }

    #[test]
    fn script_parses_and_orders_by_frame() {
        let script = InputScript::from_yaml(
            "- { frame: 5, key: w, pressed: false }\n- { frame: 1, key: w }\n- { frame: 5, key: f }\n",
        )
        .unwrap();
        assert_eq!(script.len(), 3);
        let at_five: Vec<_> = script.events_at(5).map(|e| e.key.as_str()).collect();
        assert_eq!(at_five, ["w", "f"]);
        assert!(script.events_at(1).all(|e| e.pressed));
    }

    #[test]
    fn script_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.yaml");
        std::fs::write(&path, "- { frame: 2, key: ArrowLeft }\n").unwrap();
        let script = InputScript::load(&path).unwrap();
        assert_eq!(script.events_at(2).count(), 1);

        let missing = InputScript::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(format!("{missing:#}").contains("absent.yaml"));
    }

    #[test]
    fn held_keys_press_on_first_frame() {
        let script = InputScript::default().with_held(&["w", "ArrowLeft"]);
        assert_eq!(script.events_at(1).count(), 2);
        assert_eq!(script.events_at(2).count(), 0);
    }

    #[test]
    fn scripted_walk_reaches_cube_and_highlights() {
        let (mut nav, scene) = navigator();
        let script =
            InputScript::from_yaml("- { frame: 1, key: w }\n- { frame: 1, key: f }\n").unwrap();
        let mut host = ScriptedHost::new(script, Vec::new(), OutputFormat::Text);

        let frames = run(&mut nav, &scene, &mut host, Some(60));
        assert_eq!(frames, 60);
        let out = String::from_utf8(host.finish().unwrap()).unwrap();
        assert_eq!(out.lines().count(), 60);
        assert!(out.contains("target="));
        assert!(out.contains("blocked by"));
        // Stopped short of the cube face at z = 0.5.
        assert!(nav.pose().position.z > 0.5);
        assert_eq!(nav.highlights().len(), 1);
    }

    #[test]
    fn json_lines_are_frame_reports() {
        let (mut nav, scene) = navigator();
        let script = InputScript::default().with_held(&["ArrowRight"]);
        let mut host = ScriptedHost::new(script, Vec::new(), OutputFormat::Json);
        run(&mut nav, &scene, &mut host, Some(3));

        let out = String::from_utf8(host.finish().unwrap()).unwrap();
        let values: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(values.len(), 3);
        assert_eq!(values[2]["frame"], 3);
        assert!(values[2]["pose"]["yaw"].as_f64().unwrap() < 0.0);
        assert!(values[0]["obstruction"].is_null());
    }

    #[test]
    fn release_stops_motion() {
        let (mut nav, scene) = navigator();
        let script = InputScript::from_yaml(
            "- { frame: 1, key: s }\n- { frame: 3, key: s, pressed: false }\n",
        )
        .unwrap();
        let mut host = ScriptedHost::new(script, Vec::new(), OutputFormat::Text);
        run(&mut nav, &scene, &mut host, Some(10));
        // Frames 1 and 2 move backwards by speed each.
        assert!((nav.pose().position.z - 5.2).abs() < 1e-5);
    }
}
