//! Association gate: which stations take part in the location solve.

use crate::station::StationRun;

/// A station is usable once it carries a P pick. S picks are not required.
#[must_use]
pub fn usable(run: &StationRun) -> bool {
    run.p_pick.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_requires_p_only() {
        let mut run = StationRun::new("HUAL", 4);
        assert!(!usable(&run));

        run.s_pick = Some(40);
        assert!(!usable(&run));

        run.p_pick = Some(12);
        run.s_pick = None;
        assert!(usable(&run));
    }
}
