//! Scene geometry: fixed camera, ground grid and the oriented cube.

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::surface::Surface;
use super::transform::RenderTransform;

/// Half extent of the ground grid in world units.
const GRID_HALF: i32 = 4;

/// Ground plane height (the cube sits with its centre at the origin).
const GRID_Y: f32 = -1.5;

const CUBE_CORNERS: [Vec3; 8] = [
    Vec3::new(-0.5, -0.5, -0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(0.5, 0.5, -0.5),
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(-0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(-0.5, 0.5, 0.5),
];

const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Fixed perspective camera looking at the origin.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(3.0, 2.5, 4.0),
            target: Vec3::ZERO,
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    /// World-to-clip matrix for a viewport of the given aspect (width / height).
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
            * Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }
}

/// Projects world points onto a surface's cell grid.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    view_proj: Mat4,
    near: f32,
    cols: f32,
    rows: f32,
}

impl Viewport {
    pub fn new(camera: &Camera, cols: u16, rows: u16, cell_aspect: f32) -> Self {
        let (cols, rows) = (cols as f32, rows as f32);
        let aspect = cols / (rows * cell_aspect);
        Self {
            view_proj: camera.view_projection(aspect),
            near: camera.near,
            cols,
            rows,
        }
    }

    /// Cell coordinates of a world point, or `None` when it is behind the camera.
    pub fn project(&self, p: Vec3) -> Option<Vec2> {
        let clip = self.view_proj * Vec4::new(p.x, p.y, p.z, 1.0);
        if clip.w < self.near {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * (self.cols - 1.0),
            (1.0 - ndc.y) * 0.5 * (self.rows - 1.0),
        ))
    }

    fn line<S: Surface + ?Sized>(&self, surface: &mut S, a: Vec3, b: Vec3, glyph: char) {
        if let (Some(pa), Some(pb)) = (self.project(a), self.project(b)) {
            surface.draw_line(pa, pb, glyph);
        }
    }
}

/// Draw the ground grid.
pub fn draw_grid<S: Surface + ?Sized>(surface: &mut S, viewport: &Viewport) {
    let extent = GRID_HALF as f32;
    for i in -GRID_HALF..=GRID_HALF {
        let t = i as f32;
        viewport.line(
            surface,
            Vec3::new(t, GRID_Y, -extent),
            Vec3::new(t, GRID_Y, extent),
            '.',
        );
        viewport.line(
            surface,
            Vec3::new(-extent, GRID_Y, t),
            Vec3::new(extent, GRID_Y, t),
            '.',
        );
    }
}

/// Draw the unit cube under `transform`, with its local axes marked.
pub fn draw_body<S: Surface + ?Sized>(
    surface: &mut S,
    viewport: &Viewport,
    transform: &RenderTransform,
) {
    let corners = CUBE_CORNERS.map(|c| transform.apply(c));
    for (a, b) in CUBE_EDGES {
        viewport.line(surface, corners[a], corners[b], '#');
    }

    let origin = transform.apply(Vec3::ZERO);
    for (axis, glyph) in [(Vec3::X, 'x'), (Vec3::Y, 'y'), (Vec3::Z, 'z')] {
        viewport.line(surface, origin, transform.apply(axis * 0.9), glyph);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat3;

    #[test]
    fn test_target_projects_to_centre() {
        let viewport = Viewport::new(&Camera::default(), 81, 41, 2.0);
        let p = viewport.project(Vec3::ZERO).unwrap();
        assert!((p - Vec2::new(40.0, 20.0)).length() < 1e-3, "{:?}", p);
    }

    #[test]
    fn test_point_behind_camera_is_rejected() {
        let camera = Camera::default();
        let viewport = Viewport::new(&camera, 80, 24, 2.0);
        let behind = camera.eye + (camera.eye - camera.target);
        assert!(viewport.project(behind).is_none());
    }

    #[test]
    fn test_up_is_up_on_screen() {
        let viewport = Viewport::new(&Camera::default(), 80, 40, 2.0);
        let low = viewport.project(Vec3::ZERO).unwrap();
        let high = viewport.project(Vec3::Y).unwrap();
        assert!(high.y < low.y);
    }

    #[test]
    fn test_degenerate_aspect_falls_back() {
        let m = Camera::default().view_projection(f32::NAN);
        assert!(m.is_finite());
    }

    #[test]
    fn test_identity_transform_keeps_corners() {
        let transform = RenderTransform {
            rotation: Mat3::IDENTITY,
            position: Vec3::ZERO,
            scale: 1.0,
        };
        for c in CUBE_CORNERS {
            assert_eq!(transform.apply(c), c);
        }
    }
}
