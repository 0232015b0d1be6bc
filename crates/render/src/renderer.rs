use crate::view::RenderView;
use walkthrough_common::HighlightState;
use walkthrough_scene::{Scene, SceneObject};

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub frame: u64,
    pub scene: &'a Scene,
    pub view: &'a RenderView,
    pub highlights: &'a HighlightState,
}

impl FrameView<'_> {
    /// Colour to draw `object` with this frame.
    pub fn color_of(&self, object: &SceneObject) -> [f32; 4] {
        if self.highlights.is_highlighted(object.id) {
            self.scene.environment().highlight_color
        } else {
            object.color
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// Renderers read the scene, the view and the highlight state; they never
/// feed anything back into navigation.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, frame: &FrameView<'_>) -> Self::Output;
}

/// Plain-text renderer for headless runs, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &FrameView<'_>) -> String {
        let view = frame.view;
        let forward = view.forward();
        let mut out = String::new();
        out.push_str(&format!("=== Frame {} ===\n", frame.frame));
        out.push_str(&format!(
            "Camera: eye=({:.2}, {:.2}, {:.2}) yaw={:.3} forward=({:.2}, {:.2}, {:.2}) \
             aspect={:.2}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.yaw,
            forward.x,
            forward.y,
            forward.z,
            view.aspect
        ));
        let objects = frame.scene.objects();
        out.push_str(&format!(
            "Objects: {} (highlighted: {})\n",
            objects.len(),
            frame.highlights.len()
        ));

        for placed in objects {
            let object = placed.object;
            let p = placed.world_position;
            let c = frame.color_of(object);
            let marker = if frame.highlights.is_highlighted(object.id) {
                " *"
            } else {
                ""
            };
            out.push_str(&format!(
                "  [{}] {} {:?} pos=({:.2}, {:.2}, {:.2}) color=({:.2}, {:.2}, {:.2}){marker}\n",
                object.id, object.name, object.tag, p.x, p.y, p.z, c[0], c[1], c[2]
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkthrough_scene::demo_scene;

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::new();
        let view = RenderView::default();
        let highlights = HighlightState::new();
        let output = DebugTextRenderer::new().render(&FrameView {
            frame: 0,
            scene: &scene,
            view: &view,
            highlights: &highlights,
        });

        assert!(output.contains("Frame 0"));
        assert!(output.contains("Objects: 0"));
    }

    #[test]
    fn highlighted_object_uses_highlight_color() {
        let scene = demo_scene();
        let cube = scene.hittable_ids()[0];
        let view = RenderView::from_pose(scene.spawn());
        let mut highlights = HighlightState::new();
        highlights.highlight(cube);

        let frame = FrameView {
            frame: 3,
            scene: &scene,
            view: &view,
            highlights: &highlights,
        };
        let placed = scene.get(cube).unwrap();
        assert_eq!(frame.color_of(placed.object), [1.0, 0.0, 0.0, 1.0]);

        let output = DebugTextRenderer::new().render(&frame);
        assert!(output.contains("Objects: 2 (highlighted: 1)"));
        assert!(output.contains("cube Hittable"));
        assert!(output.contains(" *"));
    }

    #[test]
    fn default_appearance_without_highlight() {
        let scene = demo_scene();
        let cube = scene.hittable_ids()[0];
        let view = RenderView::default();
        let highlights = HighlightState::new();
        let frame = FrameView {
            frame: 1,
            scene: &scene,
            view: &view,
            highlights: &highlights,
        };
        let placed = scene.get(cube).unwrap();
        assert_eq!(frame.color_of(placed.object), [0.0, 1.0, 1.0, 1.0]);
        assert!(!DebugTextRenderer::new().render(&frame).contains(" *"));
    }
}
