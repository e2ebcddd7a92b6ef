// crates/ap_algo/src/ties.rs
//
// Tie resolution shared by both allocation methods.
//
// Contenders are always passed in canonical party order, so under
// `DeterministicOrder` index 0 wins. Under `Random` the pick comes from a
// `TieRng` seeded once per allocation run; every draw is kept as a crumb.

use ap_core::rng::{TieCrumb, TieRng};

use crate::{Params, TiePolicy};

pub(crate) struct TieBreaker {
    policy: TiePolicy,
    rng: Option<TieRng>,
    crumbs: Vec<TieCrumb>,
}

impl TieBreaker {
    pub(crate) fn new(params: &Params) -> Self {
        let rng = match params.tie_policy {
            TiePolicy::Random => Some(TieRng::from_seed_u64(params.tie_seed)),
            TiePolicy::DeterministicOrder => None,
        };
        Self {
            policy: params.tie_policy,
            rng,
            crumbs: Vec::new(),
        }
    }

    /// Index of the winner among `n` tied contenders (canonical order).
    pub(crate) fn pick(&mut self, ctx: &str, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        match (self.policy, self.rng.as_mut()) {
            (TiePolicy::Random, Some(rng)) => match rng.choose_index_with_crumb(ctx, n) {
                Some((idx, crumb)) => {
                    self.crumbs.push(crumb);
                    idx
                }
                None => 0,
            },
            _ => 0,
        }
    }

    pub(crate) fn into_crumbs(self) -> Vec<TieCrumb> {
        self.crumbs
    }
}
