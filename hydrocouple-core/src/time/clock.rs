use super::domain::TimeDomain;
use crate::component::Category;
use crate::errors::{CouplingError, CouplingResult};

/// Which categories advance during one step of the surface layer domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Position in the surface layer domain.
    pub index: usize,
    pub surfacelayer: bool,
    pub subsurface: bool,
    pub openwater: bool,
}

impl Tick {
    pub fn is_active(&self, category: Category) -> bool {
        match category {
            Category::SurfaceLayer => self.surfacelayer,
            Category::SubSurface => self.subsurface,
            Category::OpenWater => self.openwater,
        }
    }
}

/// Synchronises three categories stepping at different temporal resolutions.
///
/// The surface layer domain is the finest and drives the iteration. For each of its
/// timestamps a category is switched on only if that timestamp also belongs to the
/// category's own domain. All three domains share a calendar, a start and an end.
///
/// Iterating yields one [`Tick`] per surface layer step; the final timestamp closes the
/// last interval and is not yielded. The clock is consumed by iteration.
#[derive(Debug, Clone)]
pub struct Clock {
    surfacelayer_switch: Vec<bool>,
    subsurface_switch: Vec<bool>,
    openwater_switch: Vec<bool>,
    position: usize,
}

impl Clock {
    pub fn new(
        surfacelayer: &TimeDomain,
        subsurface: &TimeDomain,
        openwater: &TimeDomain,
    ) -> CouplingResult<Self> {
        for (category, domain) in [
            (Category::SubSurface, subsurface),
            (Category::OpenWater, openwater),
        ] {
            let reason = if domain.calendar() != surfacelayer.calendar() {
                Some("calendar differs from the surface layer calendar")
            } else if domain.start() != surfacelayer.start() {
                Some("start differs from the surface layer start")
            } else if domain.end() != surfacelayer.end() {
                Some("end differs from the surface layer end")
            } else if domain.timestep_seconds() < surfacelayer.timestep_seconds() {
                Some("timestep is finer than the surface layer timestep")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(CouplingError::DomainIncompatible {
                    category: category.to_string(),
                    component: "clock".to_string(),
                    reason: format!("temporal domain {reason}"),
                });
            }
        }

        let switch = |domain: &TimeDomain| -> Vec<bool> {
            surfacelayer
                .timestamps()
                .iter()
                .map(|t| domain.contains(*t))
                .collect()
        };

        Ok(Self {
            surfacelayer_switch: vec![true; surfacelayer.len()],
            subsurface_switch: switch(subsurface),
            openwater_switch: switch(openwater),
            position: 0,
        })
    }

    /// The switch of `category` for every timestamp of the surface layer domain.
    pub fn switches(&self, category: Category) -> &[bool] {
        match category {
            Category::SurfaceLayer => &self.surfacelayer_switch,
            Category::SubSurface => &self.subsurface_switch,
            Category::OpenWater => &self.openwater_switch,
        }
    }

    /// Number of steps the clock yields in total.
    pub fn steps(&self) -> usize {
        self.surfacelayer_switch.len() - 1
    }
}

impl Iterator for Clock {
    type Item = Tick;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.steps() {
            return None;
        }
        let index = self.position;
        self.position += 1;
        Some(Tick {
            index,
            surfacelayer: self.surfacelayer_switch[index],
            subsurface: self.subsurface_switch[index],
            openwater: self.openwater_switch[index],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.steps() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Clock {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Calendar;

    fn days(values: &[i32]) -> TimeDomain {
        TimeDomain::new(values, "days since 2019-01-01", Calendar::Gregorian).unwrap()
    }

    #[test]
    fn test_switches() {
        let a = days(&[1, 2, 3, 4, 5, 6, 7]);
        let b = days(&[1, 3, 5, 7]);
        let c = days(&[1, 4, 7]);

        let clock = Clock::new(&a, &b, &c).unwrap();

        assert_eq!(clock.switches(Category::SurfaceLayer), &[true; 7]);
        assert_eq!(
            clock.switches(Category::SubSurface),
            &[true, false, true, false, true, false, true]
        );
        assert_eq!(
            clock.switches(Category::OpenWater),
            &[true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn test_iteration_excludes_final_timestamp() {
        let a = days(&[1, 2, 3, 4, 5, 6, 7]);
        let b = days(&[1, 3, 5, 7]);
        let c = days(&[1, 4, 7]);

        let ticks: Vec<Tick> = Clock::new(&a, &b, &c).unwrap().collect();

        assert_eq!(ticks.len(), 6);
        assert_eq!(
            ticks.iter().map(|t| t.subsurface).collect::<Vec<_>>(),
            vec![true, false, true, false, true, false]
        );
        assert_eq!(
            ticks.iter().map(|t| t.openwater).collect::<Vec<_>>(),
            vec![true, false, false, true, false, false]
        );
        assert!(ticks.iter().all(|t| t.surfacelayer));
        assert_eq!(ticks[3].index, 3);
        assert!(ticks[3].is_active(Category::OpenWater));
    }

    #[test]
    fn test_iteration_is_forward_only() {
        let a = days(&[1, 2, 3]);
        let mut clock = Clock::new(&a, &a, &a).unwrap();
        assert_eq!(clock.len(), 2);
        assert!(clock.next().is_some());
        assert!(clock.next().is_some());
        assert!(clock.next().is_none());
        assert!(clock.next().is_none());
    }

    #[test]
    fn test_end_mismatch() {
        let a = days(&[1, 2, 3, 4, 5, 6, 7]);
        let b = days(&[1, 3, 5, 7]);
        let c = days(&[1, 3, 5, 7, 9]);

        let result = Clock::new(&a, &b, &c);
        assert!(matches!(
            result,
            Err(CouplingError::DomainIncompatible { ref category, .. }) if category == "openwater"
        ));
    }

    #[test]
    fn test_start_mismatch() {
        let a = days(&[1, 2, 3, 4, 5, 6, 7]);
        let b = days(&[3, 5, 7]);
        assert!(Clock::new(&a, &b, &a).is_err());
    }

    #[test]
    fn test_calendar_mismatch() {
        let a = days(&[1, 2, 3]);
        let b = TimeDomain::new(&[1, 2, 3], "days since 2019-01-01", Calendar::NoLeap).unwrap();
        assert!(Clock::new(&a, &b, &a).is_err());
    }
}
