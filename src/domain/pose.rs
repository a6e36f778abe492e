/// Pose maps: where each named part of a runner sits inside its tile.
///
/// Coordinates are fractions of a tile (x right, y down, z toward the
/// viewer). A renderer places limbs from these anchors; the simulation
/// only supplies them. Parts missing from a map keep the renderer's
/// default placement.
///
/// The anchor set is closed, so a pose can never name a part the
/// renderer does not know.

use std::collections::BTreeMap;
use std::f32::consts::PI;

use super::entity::{DeadAnim, Facing, ViewState, Walk};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum PosePart {
    Root,
    Body,
    Dir,
    RightArm,
    LeftArm,
    RightLeg,
    LeftLeg,
}

impl PosePart {
    pub fn name(self) -> &'static str {
        match self {
            PosePart::Root => "",
            PosePart::Body => "body",
            PosePart::Dir => "dir",
            PosePart::RightArm => "r_arm1",
            PosePart::LeftArm => "l_arm1",
            PosePart::RightLeg => "r_leg1",
            PosePart::LeftLeg => "l_leg1",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

const fn p3(x: f32, y: f32, z: f32) -> Point3 {
    Point3 { x, y, z }
}

pub type PoseMap = BTreeMap<PosePart, Point3>;

/// What the pose builder needs to know about a runner this frame.
#[derive(Clone, Copy, Debug)]
pub struct Stance {
    pub walk: Walk,
    pub bar: bool,
    pub view: ViewState,
}

impl Stance {
    /// Walk-cycle phase in [-1, 1], repeating every 16 animation ticks.
    fn swing(&self) -> f32 {
        (PI * (self.view.time & 15) as f32 / 8.0).sin()
    }
}

fn climbing(sig: f32) -> PoseMap {
    BTreeMap::from([
        (PosePart::Body, p3(0.5, 0.5, 0.3)),
        (PosePart::RightArm, p3(0.3 + sig / 7.0, 0.3, 0.8 + sig / 5.0)),
        (PosePart::LeftArm, p3(0.7 + sig / 7.0, 0.3, 0.8 - sig / 5.0)),
        (PosePart::RightLeg, p3(0.2 - sig / 4.0, 1.0, 0.7 + sig / 5.0)),
        (PosePart::LeftLeg, p3(0.8 - sig / 4.0, 1.0, 0.7 - sig / 5.0)),
    ])
}

fn hanging(sig: f32, dir: Facing) -> PoseMap {
    let (root_x, dir_x, body_x) = match dir {
        Facing::Left => (0.7, 0.3, 0.7),
        Facing::Right => (0.3, 0.7, 0.3),
    };
    BTreeMap::from([
        (PosePart::Root, p3(root_x, 0.7, 0.5)),
        (PosePart::RightArm, p3(0.3, 0.45 + sig / 10.0, 0.9)),
        (PosePart::LeftArm, p3(0.7, 0.45 - sig / 10.0, 0.9)),
        (PosePart::RightLeg, p3(0.4, 0.7 + sig / 10.0, 0.9)),
        (PosePart::LeftLeg, p3(0.6, 0.7 - sig / 10.0, 0.9)),
        (PosePart::Dir, p3(dir_x, 0.7, 0.5)),
        (PosePart::Body, p3(body_x, 0.5, 0.5)),
    ])
}

fn running(sig: f32, dir: Facing) -> PoseMap {
    let body_x = if dir == Facing::Left { 0.4 } else { 0.6 };
    BTreeMap::from([
        (PosePart::Body, p3(body_x, 0.5, 0.6)),
        (PosePart::RightLeg, p3(0.35, 1.0, 0.5 + sig / 2.0)),
        (PosePart::LeftLeg, p3(0.65, 1.0, 0.5 - sig / 2.0)),
        (PosePart::RightArm, p3(0.2, 0.7, 0.5 - sig / 4.0)),
        (PosePart::LeftArm, p3(0.8, 0.7, 0.5 + sig / 4.0)),
    ])
}

/// Arms up, legs spread.
fn flail(pose: &mut PoseMap, sig: f32) {
    pose.insert(PosePart::RightArm, p3(0.0, 0.2 + sig / 5.0, 0.5));
    pose.insert(PosePart::LeftArm, p3(1.0, 0.2 + sig / 5.0, 0.5));
    pose.insert(PosePart::RightLeg, p3(0.1, 0.9 - sig / 10.0, 0.5));
    pose.insert(PosePart::LeftLeg, p3(0.9, 0.9 - sig / 10.0, 0.5));
}

pub fn player_pose(stance: &Stance, dead: Option<&DeadAnim>) -> PoseMap {
    if let Some(anim) = dead {
        let angle = anim.count as f32 * PI / 8.0;
        return BTreeMap::from([
            (PosePart::Root, p3(0.5 + anim.dx, 0.7 + anim.dy, 0.5 + anim.dz)),
            (PosePart::Body, p3(0.5 + angle.sin() * 0.2, 0.5, 0.5 + angle.cos() * 0.2)),
            (PosePart::RightArm, p3(0.0, 0.2, 0.5)),
            (PosePart::LeftArm, p3(1.0, 0.2, 0.5)),
            (PosePart::RightLeg, p3(0.1, 0.9, 0.5)),
            (PosePart::LeftLeg, p3(0.9, 0.9, 0.5)),
        ]);
    }
    let sig = stance.swing();
    if stance.walk.is_vertical() {
        return climbing(sig);
    }
    if stance.bar {
        let mut pose = hanging(sig, stance.view.dir);
        let beam_arm = match stance.walk {
            Walk::LeftBeam => Some(p3(0.1, 0.15, 0.4)),
            Walk::RightBeam => Some(p3(0.9, 0.85, 0.4)),
            _ => None,
        };
        if let Some(arm) = beam_arm {
            if let Some(body) = pose.get_mut(&PosePart::Body) {
                body.z = 0.7;
            }
            pose.insert(PosePart::RightArm, arm);
        }
        return pose;
    }
    match stance.walk {
        Walk::LeftBeam => BTreeMap::from([
            (PosePart::Body, p3(0.4, 0.5, 0.6)),
            (PosePart::RightArm, p3(0.0, 0.65, 0.6)),
        ]),
        Walk::RightBeam => BTreeMap::from([
            (PosePart::Body, p3(0.6, 0.5, 0.6)),
            (PosePart::LeftArm, p3(1.0, 0.65, 0.6)),
        ]),
        walk => {
            let mut pose = running(sig, stance.view.dir);
            if walk == Walk::Fall {
                flail(&mut pose, sig);
            }
            pose
        }
    }
}

/// Enemy pose. A respawning enemy spins while `reborn` counts down.
pub fn enemy_pose(stance: &Stance, reborn: u32) -> PoseMap {
    let sig = stance.swing();
    if stance.walk.is_vertical() {
        return climbing(sig);
    }
    if stance.bar {
        return hanging(sig, stance.view.dir);
    }
    let mut pose = running(sig, stance.view.dir);
    if stance.walk == Walk::Fall {
        flail(&mut pose, sig);
        if reborn > 0 {
            let angle = reborn as f32 * PI / 4.0;
            pose.insert(PosePart::Body, p3(0.5 + angle.sin() * 0.2, 0.5, 0.5 + angle.cos() * 0.2));
        }
    }
    pose
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stance(walk: Walk, bar: bool, dir: Facing) -> Stance {
        Stance { walk, bar, view: ViewState { dir, time: 4 } }
    }

    #[test]
    fn anchor_names() {
        assert_eq!(PosePart::Root.name(), "");
        assert_eq!(PosePart::RightArm.name(), "r_arm1");
        assert_eq!(PosePart::LeftLeg.name(), "l_leg1");
    }

    #[test]
    fn climbing_ignores_bar() {
        let pose = player_pose(&stance(Walk::Up, true, Facing::Left), None);
        assert!(!pose.contains_key(&PosePart::Dir));
        assert_eq!(pose.len(), 5);
    }

    #[test]
    fn hanging_mirrors_with_facing() {
        let left = player_pose(&stance(Walk::Left, true, Facing::Left), None);
        let right = player_pose(&stance(Walk::Right, true, Facing::Right), None);
        assert_eq!(left[&PosePart::Body].x, 0.7);
        assert_eq!(right[&PosePart::Body].x, 0.3);
        assert_eq!(left[&PosePart::Dir].x, 0.3);
    }

    #[test]
    fn beam_on_bar_raises_body() {
        let pose = player_pose(&stance(Walk::RightBeam, true, Facing::Right), None);
        assert_eq!(pose[&PosePart::Body].z, 0.7);
        assert_eq!(pose[&PosePart::RightArm], p3(0.9, 0.85, 0.4));
    }

    #[test]
    fn beam_on_ground_points_one_arm() {
        let pose = player_pose(&stance(Walk::LeftBeam, false, Facing::Left), None);
        assert_eq!(pose.len(), 2);
        assert_eq!(pose[&PosePart::RightArm].x, 0.0);
    }

    #[test]
    fn swing_peaks_at_quarter_cycle() {
        let pose = player_pose(&stance(Walk::Left, false, Facing::Left), None);
        // time 4 of 16: sin(pi/2) = 1
        assert!((pose[&PosePart::RightLeg].z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn dead_pose_follows_payload() {
        let anim = DeadAnim { count: 0, dx: 0.0, dy: -0.25, dz: 0.5, vy: 0.0 };
        let pose = player_pose(&stance(Walk::Left, false, Facing::Left), Some(&anim));
        let root = pose[&PosePart::Root];
        assert!((root.y - 0.45).abs() < 1e-6);
        assert!((root.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn respawning_enemy_spins() {
        let still = enemy_pose(&stance(Walk::Fall, false, Facing::Left), 0);
        let spin = enemy_pose(&stance(Walk::Fall, false, Facing::Left), 2);
        assert_ne!(still[&PosePart::Body], spin[&PosePart::Body]);
    }
}
