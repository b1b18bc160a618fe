//! Hole classification: which rings bound material and which cut it.

use plate_types::{point_in_ring, Polygon, Profile};

/// How nested rings are told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoleRule {
    /// A ring is a hole when its nearest enclosing ring is an outer of the
    /// opposite winding. Same-winding nested rings stay independent
    /// outers. Font outlines follow this convention.
    #[default]
    OppositeWinding,
    /// Even nesting depth is material, odd depth is a hole. Used for SVG
    /// artwork, whose winding is arbitrary.
    NestingParity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Outer,
    Hole { of: usize },
}

/// `container` fully encloses `ring`. Vertices on the boundary count as
/// outside, which keeps touching siblings apart.
fn encloses(container: &Polygon, ring: &Polygon) -> bool {
    ring.points.iter().all(|&p| point_in_ring(&container.points, p))
}

/// Group rings into profiles. Output order follows the first appearance
/// of each outer ring in the input; winding is left as given.
pub fn classify(rings: &[Polygon], rule: HoleRule) -> Vec<Profile> {
    // Parents are found among larger rings only, so visit largest first.
    let mut order: Vec<usize> = (0..rings.len()).collect();
    order.sort_by(|&a, &b| {
        rings[b]
            .area()
            .partial_cmp(&rings[a].area())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut roles: Vec<Option<Role>> = vec![None; rings.len()];
    let mut depth = vec![0usize; rings.len()];

    for (pos, &i) in order.iter().enumerate() {
        // Nearest enclosing ring: the smallest of the larger rings that
        // enclose this one, i.e. the last match in descending order.
        let parent = order[..pos]
            .iter()
            .rev()
            .copied()
            .find(|&j| encloses(&rings[j], &rings[i]));

        let role = match (rule, parent) {
            (_, None) => Role::Outer,
            (HoleRule::OppositeWinding, Some(p)) => match roles[p] {
                Some(Role::Outer) if rings[p].is_ccw() != rings[i].is_ccw() => Role::Hole { of: p },
                _ => Role::Outer,
            },
            (HoleRule::NestingParity, Some(p)) => {
                depth[i] = depth[p] + 1;
                if depth[i] % 2 == 1 {
                    Role::Hole { of: p }
                } else {
                    Role::Outer
                }
            }
        };
        roles[i] = Some(role);
    }

    let mut profiles: Vec<Profile> = Vec::new();
    let mut slot = vec![usize::MAX; rings.len()];
    for (i, role) in roles.iter().enumerate() {
        if role == &Some(Role::Outer) {
            slot[i] = profiles.len();
            profiles.push(Profile::solid(rings[i].clone()));
        }
    }
    for (i, role) in roles.iter().enumerate() {
        if let Some(Role::Hole { of }) = role {
            profiles[slot[*of]].holes.push(rings[i].clone());
        }
    }
    profiles
}
