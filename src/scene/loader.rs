//! Scene loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable scene files. A
//! loaded scene is prepared, its textures decoded and every index checked
//! before it is returned.

use std::fs;
use std::path::Path;

use super::Scene;
use crate::error::RenderResult;

/// Load a scene from a RON file. Texture files are resolved relative to
/// the scene file's directory.
pub fn load_scene<P: AsRef<Path>>(path: P) -> RenderResult<Scene> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let scene = parse_scene(&contents, base)?;
    log::info!(
        "loaded scene {}: {} objects, {} lights, {} textures",
        path.display(),
        scene.objects.len(),
        scene.lights.len(),
        scene.loaded.len()
    );
    Ok(scene)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &Scene, path: P) -> RenderResult<()> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a scene from a RON string (for embedded scenes or testing).
/// Texture files are resolved relative to the working directory.
pub fn load_scene_from_str(s: &str) -> RenderResult<Scene> {
    parse_scene(s, Path::new("."))
}

fn parse_scene(s: &str, base: &Path) -> RenderResult<Scene> {
    let mut scene: Scene = ron::from_str(s)?;
    scene.prepare();
    scene.load_textures(base)?;
    scene.validate()?;
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::lighting::LightKind;
    use crate::rasterizer::ShadingMode;
    use crate::scene::{CameraSetup, MeshSource};

    const SCENE: &str = r#"(
        textures: [
            Checkerboard(size: 8, a: (r: 255, g: 255, b: 255, a: 255), b: (r: 0, g: 0, b: 0, a: 255)),
        ],
        objects: [
            (
                name: "box",
                mesh: Cube(size: 2.0, color: (r: 200, g: 40, b: 40, a: 255)),
                position: (x: 0.0, y: 0.0, z: 5.0),
                rotation: (x: 0.0, y: 30.0, z: 0.0),
                shading: Some(Gouraud),
                texture: Some(0),
            ),
            (
                name: "tri",
                mesh: Custom((
                    vertices: [
                        (pos: (x: 0.0, y: 1.0, z: 0.0)),
                        (pos: (x: 1.0, y: -1.0, z: 0.0)),
                        (pos: (x: -1.0, y: -1.0, z: 0.0)),
                    ],
                    faces: [
                        (indices: (0, 1, 2), color: (r: 0, g: 255, b: 0, a: 255)),
                    ],
                )),
                scale: 2.0,
            ),
        ],
        lights: [
            (color: (r: 255, g: 255, b: 255, a: 255), intensity: 0.2, kind: Ambient),
            (color: (r: 255, g: 255, b: 255, a: 255), intensity: 0.8, kind: Infinite(direction: (x: 0.0, y: -3.0, z: 4.0))),
        ],
        camera: LookAt(position: (x: 0.0, y: 2.0, z: -5.0), target: (x: 0.0, y: 0.0, z: 5.0)),
    )"#;

    #[test]
    fn test_load_scene_from_str() {
        let scene = load_scene_from_str(SCENE).unwrap();
        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.loaded.len(), 1);
        assert_eq!(scene.loaded[0].width, 8);

        let cube = &scene.objects[0];
        assert_eq!(cube.mesh().faces.len(), 12);
        assert!(cube.mesh().faces.iter().all(|f| f.shading == ShadingMode::Gouraud));
        assert_eq!(scene.objects[1].scale, 2.0);
        assert_eq!(scene.objects[0].scale, 1.0);
        assert!(matches!(scene.camera, CameraSetup::LookAt { .. }));

        // Directions are normalized on load
        match scene.lights[1].kind {
            LightKind::Infinite { direction } => assert!((direction.len() - 1.0).abs() < 1e-5),
            _ => panic!("expected an infinite light"),
        }
    }

    #[test]
    fn test_bad_vertex_index_rejected() {
        let src = r#"(
            objects: [(
                name: "broken",
                mesh: Custom((
                    vertices: [(pos: (x: 0.0, y: 0.0, z: 0.0))],
                    faces: [(indices: (0, 1, 2), color: (r: 0, g: 0, b: 0, a: 255))],
                )),
            )],
        )"#;
        match load_scene_from_str(src) {
            Err(RenderError::InvalidMesh { object, index, .. }) => {
                assert_eq!(object, "broken");
                assert_eq!(index, 1);
            }
            other => panic!("expected InvalidMesh, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_texture_slot_rejected() {
        let src = r#"(
            objects: [(
                name: "c",
                mesh: Cube(size: 1.0, color: (r: 0, g: 0, b: 0, a: 255)),
                texture: Some(2),
            )],
        )"#;
        assert!(matches!(
            load_scene_from_str(src),
            Err(RenderError::InvalidTexture { texture: 2, loaded: 0, .. })
        ));
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        assert!(matches!(load_scene_from_str("(objects: [(name: )])"), Err(RenderError::Parse(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let scene = load_scene_from_str(SCENE).unwrap();
        let dir = std::env::temp_dir().join(format!("scanline-engine-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scene.ron");

        save_scene(&scene, &path).unwrap();
        let reloaded = load_scene(&path).unwrap();
        assert_eq!(reloaded.objects.len(), scene.objects.len());
        assert_eq!(reloaded.objects[0].mesh(), scene.objects[0].mesh());
        assert!(matches!(reloaded.objects[1].mesh, MeshSource::Custom(_)));
        assert_eq!(reloaded.lights.len(), scene.lights.len());
        assert_eq!(reloaded.lights[1].intensity, scene.lights[1].intensity);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_shipped_scene_loads() {
        let scene = load_scene(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/scene.ron")).unwrap();
        assert_eq!(scene.objects.len(), 6);
        assert_eq!(scene.loaded.len(), 2);
    }
}
