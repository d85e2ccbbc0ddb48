//! Camera model
//!
//! Shared state (position, motion, projection) lives on [`Camera`]; the
//! orientation is one of two interchangeable models:
//!
//! - **Euler**: pitch, yaw and roll in degrees. Camera-to-world rotation is
//!   yaw (about +Y), then pitch (about the yawed +X), then roll (about the
//!   resulting forward axis). The world-to-camera transform applies the
//!   exact inverse: translate, un-yaw, un-pitch, un-roll.
//! - **UVN**: an orthonormal basis (u right, v up, n forward) built from a
//!   look-at target and an up hint. Changing the target starts a short
//!   transition that walks the view vector toward the new direction over
//!   [`LOOK_AT_STEPS`] updates instead of snapping.
//!
//! Coordinates: X right, Y up, Z forward (the camera looks down +Z).

use serde::{Deserialize, Serialize};

use crate::config::RasterSettings;
use crate::math::{trig_table, Mat4, Vec3, EPSILON};

/// Updates a look-at transition takes to reach its target direction
pub const LOOK_AT_STEPS: u32 = 16;

/// Pitch is kept inside +-this many degrees
pub const PITCH_LIMIT: f32 = 89.0;

/// Projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewParams {
    /// Horizontal field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport in pixels
    pub width: usize,
    pub height: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self::from_settings(&RasterSettings::default())
    }
}

impl ViewParams {
    pub fn from_settings(settings: &RasterSettings) -> Self {
        Self {
            fov: settings.fov,
            near: settings.near,
            far: settings.far,
            width: settings.width,
            height: settings.height,
        }
    }

    /// Width over height
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Distance of view: where the projection plane sits so that it spans
    /// -1..1 horizontally across the field of view.
    pub fn dov(&self) -> f32 {
        let (s, c) = trig_table().sin_cos(self.fov * 0.5);
        c / s
    }

    /// Half-width of the visible volume at depth `z`
    pub fn x_extent(&self, z: f32) -> f32 {
        z / self.dov()
    }

    /// Half-height of the visible volume at depth `z`
    pub fn y_extent(&self, z: f32) -> f32 {
        z / (self.dov() * self.aspect())
    }

    /// Camera space to screen space. Keeps camera depth in `z`.
    ///
    /// `x' = x * dov / z`, `y' = y * dov * aspect / z`, then -1..1 is
    /// mapped onto 0..width and 0..height with the origin bottom-left.
    /// Callers clip to the near plane first, so `z` is positive.
    pub fn project(&self, p: Vec3) -> Vec3 {
        self.projector().project(p)
    }

    /// Projection factors resolved once, for projecting many points
    pub fn projector(&self) -> Projector {
        let dov = self.dov();
        Projector {
            kx: dov,
            ky: dov * self.aspect(),
            half_w: 0.5 * self.width as f32,
            half_h: 0.5 * self.height as f32,
        }
    }
}

/// [`ViewParams::project`] with the field-of-view lookup already done
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    kx: f32,
    ky: f32,
    half_w: f32,
    half_h: f32,
}

impl Projector {
    pub fn project(&self, p: Vec3) -> Vec3 {
        let inv_z = 1.0 / p.z;
        Vec3::new(
            (p.x * self.kx * inv_z + 1.0) * self.half_w,
            (p.y * self.ky * inv_z + 1.0) * self.half_h,
            p.z,
        )
    }
}

/// An in-progress look-at change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookTransition {
    pub from: Vec3,
    pub to: Vec3,
    pub step: u32,
}

/// Orientation state, one variant per model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orientation {
    /// Angles in degrees. Positive pitch looks up, positive yaw turns right.
    Euler { pitch: f32, yaw: f32, roll: f32 },
    Uvn {
        u: Vec3,
        v: Vec3,
        n: Vec3,
        up_hint: Vec3,
        transition: Option<LookTransition>,
    },
}

/// Camera state
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Fraction of velocity lost per second
    pub damping: f32,
    pub view: ViewParams,
    pub orientation: Orientation,
}

impl Default for Camera {
    fn default() -> Self {
        Self::euler(Vec3::ZERO, 0.0, 0.0, 0.0, ViewParams::default())
    }
}

/// Right and up vectors for a forward direction, from an up hint.
fn basis_from_forward(n: Vec3, up_hint: Vec3) -> (Vec3, Vec3) {
    let mut u = up_hint.cross(n);
    if u.len_squared() < EPSILON {
        // Looking along the hint
        u = Vec3::RIGHT;
    }
    let u = u.normalize();
    let v = n.cross(u).normalize();
    (u, v)
}

/// Forward direction from elevation and heading, in degrees.
pub fn spherical_direction(elevation: f32, heading: f32) -> Vec3 {
    let trig = trig_table();
    let (se, ce) = trig.sin_cos(elevation);
    let (sh, ch) = trig.sin_cos(heading);
    Vec3::new(ce * sh, se, ce * ch)
}

impl Camera {
    pub fn euler(position: Vec3, pitch: f32, yaw: f32, roll: f32, view: ViewParams) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            damping: 4.0,
            view,
            orientation: Orientation::Euler { pitch, yaw, roll },
        }
    }

    /// UVN camera looking from `position` toward `target`.
    pub fn look_at(position: Vec3, target: Vec3, up_hint: Vec3, view: ViewParams) -> Self {
        let mut n = (target - position).normalize();
        if n.len_squared() < EPSILON {
            n = Vec3::FORWARD;
        }
        let up_hint = up_hint.normalize();
        let (u, v) = basis_from_forward(n, up_hint);
        Self {
            orientation: Orientation::Uvn {
                u,
                v,
                n,
                up_hint,
                transition: None,
            },
            ..Self::euler(position, 0.0, 0.0, 0.0, view)
        }
    }

    /// UVN camera whose view vector is given by elevation and heading (degrees).
    pub fn spherical(position: Vec3, elevation: f32, heading: f32, view: ViewParams) -> Self {
        let dir = spherical_direction(elevation, heading);
        Self::look_at(position, position + dir, Vec3::UP, view)
    }

    /// Camera-to-world rotation. Its columns are the right, up and forward axes.
    pub fn rotation(&self) -> Mat4 {
        match self.orientation {
            Orientation::Euler { pitch, yaw, roll } => {
                Mat4::rotation_y(yaw) * Mat4::rotation_x(-pitch) * Mat4::rotation_z(roll)
            }
            Orientation::Uvn { u, v, n, .. } => Mat4::from_rows(u, v, n).transpose(),
        }
    }

    /// World space to camera space.
    pub fn world_to_camera(&self) -> Mat4 {
        let rotation = match self.orientation {
            Orientation::Euler { pitch, yaw, roll } => {
                Mat4::rotation_z(-roll) * Mat4::rotation_x(pitch) * Mat4::rotation_y(-yaw)
            }
            Orientation::Uvn { u, v, n, .. } => Mat4::from_rows(u, v, n),
        };
        rotation * Mat4::translation(-self.position)
    }

    /// World-space (right, up, forward).
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let r = self.rotation();
        (r.column(0), r.column(1), r.column(2))
    }

    pub fn forward(&self) -> Vec3 {
        self.basis().2
    }

    /// Turn toward a new target. A UVN camera eases its view vector there
    /// over the next [`LOOK_AT_STEPS`] calls to [`Camera::advance_look`]; an
    /// Euler camera takes the matching yaw and pitch at once.
    pub fn set_target(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize();
        if dir.len_squared() < EPSILON {
            return;
        }
        match &mut self.orientation {
            Orientation::Euler { pitch, yaw, .. } => {
                *yaw = dir.x.atan2(dir.z).to_degrees();
                *pitch = dir.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-PITCH_LIMIT, PITCH_LIMIT);
            }
            Orientation::Uvn { n, transition, .. } => {
                *transition = Some(LookTransition {
                    from: *n,
                    to: dir,
                    step: 0,
                });
            }
        }
    }

    /// Advance a pending look-at transition by one step.
    pub fn advance_look(&mut self) {
        let Orientation::Uvn {
            u,
            v,
            n,
            up_hint,
            transition,
        } = &mut self.orientation
        else {
            return;
        };
        let Some(t) = transition.as_mut() else {
            return;
        };

        t.step += 1;
        let done = t.step >= LOOK_AT_STEPS;
        let next = if done {
            Some(t.to)
        } else {
            let dir = t.from.lerp(t.to, t.step as f32 / LOOK_AT_STEPS as f32);
            // Opposite directions pass through zero halfway
            (dir.len_squared() > EPSILON).then(|| dir.normalize())
        };
        if done {
            *transition = None;
        }
        if let Some(dir) = next {
            *n = dir;
            let (nu, nv) = basis_from_forward(dir, *up_hint);
            *u = nu;
            *v = nv;
        }
    }

    pub fn is_turning(&self) -> bool {
        matches!(
            self.orientation,
            Orientation::Uvn {
                transition: Some(_),
                ..
            }
        )
    }

    /// Mouse-look style rotation in degrees. Pitch is clamped to avoid
    /// flipping over the vertical.
    pub fn rotate(&mut self, d_pitch: f32, d_yaw: f32) {
        match &mut self.orientation {
            Orientation::Euler { pitch, yaw, .. } => {
                *yaw = (*yaw + d_yaw) % 360.0;
                *pitch = (*pitch + d_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
            }
            Orientation::Uvn {
                u,
                v,
                n,
                up_hint,
                transition,
            } => {
                let elevation = n.y.clamp(-1.0, 1.0).asin().to_degrees();
                let heading = n.x.atan2(n.z).to_degrees();
                let dir = spherical_direction(
                    (elevation + d_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT),
                    heading + d_yaw,
                );
                *transition = None;
                *n = dir.normalize();
                let (nu, nv) = basis_from_forward(*n, *up_hint);
                *u = nu;
                *v = nv;
            }
        }
    }

    /// Set acceleration from a camera-relative thrust (x right, y up, z forward).
    pub fn thrust(&mut self, local: Vec3) {
        let (right, up, forward) = self.basis();
        self.acceleration = right * local.x + up * local.y + forward * local.z;
    }

    /// Apply acceleration and damping to velocity, then velocity to position.
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += self.acceleration * dt;
        self.velocity = self.velocity * (1.0 - self.damping * dt).max(0.0);
        self.position += self.velocity * dt;
    }

    /// Per-frame update: motion, then one look-at step.
    pub fn update(&mut self, dt: f32) {
        self.integrate(dt);
        self.advance_look();
    }
}
