//! Spatial domains of components.
//!
//! Only regular latitude/longitude grids (optionally rotated and optionally with an
//! altitude axis) are supported by components. Unstructured meshes can be described but
//! are rejected when a component is bound to them.
//!
//! ```rust
//! use hydrocouple_core::space::{Grid, GridLocation};
//!
//! let grid = Grid::from_extent_and_resolution(
//!     (51.0, 55.0),
//!     (-2.0, 1.0),
//!     1.0,
//!     1.0,
//!     GridLocation::Centre,
//! )
//! .unwrap();
//! assert_eq!(grid.shape(), vec![4, 3]);
//! assert_eq!(grid.latitude().values(), &[51.5, 52.5, 53.5, 54.5]);
//! ```

use crate::errors::{CouplingError, CouplingResult};
use is_close::is_close;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The spatial domain of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpaceDomain {
    Grid(Grid),
    /// An unstructured mesh, described only by its number of cells.
    Mesh { cell_count: usize },
}

impl SpaceDomain {
    pub fn as_grid(&self) -> Option<&Grid> {
        match self {
            SpaceDomain::Grid(grid) => Some(grid),
            SpaceDomain::Mesh { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpaceDomain::Grid(grid) => grid.grid_name(),
            SpaceDomain::Mesh { .. } => "Mesh",
        }
    }
}

impl From<Grid> for SpaceDomain {
    fn from(grid: Grid) -> Self {
        SpaceDomain::Grid(grid)
    }
}

/// One axis of a grid: cell centres and the `[lower, upper]` bounds of each cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GridAxisRepr")]
pub struct GridAxis {
    values: Vec<f64>,
    bounds: Vec<[f64; 2]>,
}

#[derive(Deserialize)]
struct GridAxisRepr {
    values: Vec<f64>,
    bounds: Vec<[f64; 2]>,
}

impl TryFrom<GridAxisRepr> for GridAxis {
    type Error = CouplingError;

    fn try_from(repr: GridAxisRepr) -> CouplingResult<Self> {
        Self::new(repr.values, repr.bounds)
    }
}

impl GridAxis {
    pub fn new(values: Vec<f64>, bounds: Vec<[f64; 2]>) -> CouplingResult<Self> {
        if values.is_empty() {
            return Err(CouplingError::InvalidDomain(
                "a grid axis needs at least one cell".into(),
            ));
        }
        if values.len() != bounds.len() {
            return Err(CouplingError::InvalidDomain(format!(
                "a grid axis of {} cells was given {} bounds",
                values.len(),
                bounds.len()
            )));
        }
        if values.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(CouplingError::InvalidDomain(
                "grid axis values must be strictly increasing".into(),
            ));
        }
        if let Some((value, [lower, upper])) = values
            .iter()
            .zip(&bounds)
            .find(|(v, [lower, upper])| !(lower <= *v && *v <= upper))
        {
            return Err(CouplingError::InvalidDomain(format!(
                "the bounds [{lower}, {upper}] do not enclose the value {value}"
            )));
        }
        Ok(Self { values, bounds })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn bounds(&self) -> &[[f64; 2]] {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn check_range(&self, name: &str, min: f64, max: f64) -> CouplingResult<()> {
        let out_of_range = self
            .bounds
            .iter()
            .flatten()
            .any(|b| *b < min || *b > max);
        if out_of_range {
            return Err(CouplingError::InvalidDomain(format!(
                "{name} must lie within [{min}, {max}]"
            )));
        }
        Ok(())
    }
}

impl PartialEq for GridAxis {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| is_close!(*a, *b))
            && self
                .bounds
                .iter()
                .flatten()
                .zip(other.bounds.iter().flatten())
                .all(|(a, b)| is_close!(*a, *b))
    }
}

/// Parameters of a rotated pole grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RotatedPole {
    pub grid_north_pole_latitude: f64,
    pub grid_north_pole_longitude: f64,
    pub earth_radius: f64,
}

impl PartialEq for RotatedPole {
    fn eq(&self, other: &Self) -> bool {
        is_close!(self.grid_north_pole_latitude, other.grid_north_pole_latitude)
            && is_close!(self.grid_north_pole_longitude, other.grid_north_pole_longitude)
            && is_close!(self.earth_radius, other.earth_radius)
    }
}

/// Where the coordinate of a cell sits within the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridLocation {
    Centre,
    LowerLeft,
    UpperLeft,
    LowerRight,
    UpperRight,
}

impl GridLocation {
    /// Cell extent relative to its coordinate, in units of resolution, as
    /// `(latitude span, longitude span)`.
    fn spans(&self) -> ([f64; 2], [f64; 2]) {
        match self {
            GridLocation::Centre => ([-0.5, 0.5], [-0.5, 0.5]),
            GridLocation::LowerLeft => ([0.0, 1.0], [0.0, 1.0]),
            GridLocation::UpperLeft => ([-1.0, 0.0], [0.0, 1.0]),
            GridLocation::LowerRight => ([0.0, 1.0], [-1.0, 0.0]),
            GridLocation::UpperRight => ([-1.0, 0.0], [-1.0, 0.0]),
        }
    }
}

/// A regular latitude/longitude grid, possibly on a rotated pole.
///
/// Data on the grid have shape `(Z, Y, X)` when an altitude axis is present and `(Y, X)`
/// otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr")]
pub struct Grid {
    rotated_pole: Option<RotatedPole>,
    latitude: GridAxis,
    longitude: GridAxis,
    altitude: Option<GridAxis>,
}

/// Serialised form of a [`Grid`], rebuilt through the checking constructors.
#[derive(Deserialize)]
struct GridRepr {
    rotated_pole: Option<RotatedPole>,
    latitude: GridAxis,
    longitude: GridAxis,
    altitude: Option<GridAxis>,
}

impl TryFrom<GridRepr> for Grid {
    type Error = CouplingError;

    fn try_from(repr: GridRepr) -> CouplingResult<Self> {
        let grid = match repr.rotated_pole {
            Some(pole) => Self::rotated(repr.latitude, repr.longitude, pole)?,
            None => Self::latlon(repr.latitude, repr.longitude)?,
        };
        Ok(match repr.altitude {
            Some(altitude) => grid.with_altitude(altitude),
            None => grid,
        })
    }
}

impl Grid {
    pub fn latlon(latitude: GridAxis, longitude: GridAxis) -> CouplingResult<Self> {
        latitude.check_range("latitude", -90.0, 90.0)?;
        longitude.check_range("longitude", -180.0, 360.0)?;
        Ok(Self {
            rotated_pole: None,
            latitude,
            longitude,
            altitude: None,
        })
    }

    /// A grid whose axes are latitude and longitude in the rotated frame of `pole`.
    pub fn rotated(
        grid_latitude: GridAxis,
        grid_longitude: GridAxis,
        pole: RotatedPole,
    ) -> CouplingResult<Self> {
        let mut grid = Self::latlon(grid_latitude, grid_longitude)?;
        if pole.earth_radius <= 0.0 {
            return Err(CouplingError::InvalidDomain(
                "the earth radius must be positive".into(),
            ));
        }
        grid.rotated_pole = Some(pole);
        Ok(grid)
    }

    pub fn with_altitude(mut self, altitude: GridAxis) -> Self {
        self.altitude = Some(altitude);
        self
    }

    /// A grid covering the given extents with cells of the given resolutions.
    ///
    /// Each extent must hold a whole number of cells. `location` determines where within
    /// its cell each coordinate lies.
    pub fn from_extent_and_resolution(
        latitude_extent: (f64, f64),
        longitude_extent: (f64, f64),
        latitude_resolution: f64,
        longitude_resolution: f64,
        location: GridLocation,
    ) -> CouplingResult<Self> {
        let (latitude_span, longitude_span) = location.spans();
        Self::latlon(
            regular_axis("latitude", latitude_extent, latitude_resolution, latitude_span)?,
            regular_axis(
                "longitude",
                longitude_extent,
                longitude_resolution,
                longitude_span,
            )?,
        )
    }

    pub fn grid_name(&self) -> &'static str {
        match self.rotated_pole {
            Some(_) => "RotatedLatLonGrid",
            None => "LatLonGrid",
        }
    }

    pub fn latitude(&self) -> &GridAxis {
        &self.latitude
    }

    pub fn longitude(&self) -> &GridAxis {
        &self.longitude
    }

    pub fn altitude(&self) -> Option<&GridAxis> {
        self.altitude.as_ref()
    }

    pub fn rotated_pole(&self) -> Option<&RotatedPole> {
        self.rotated_pole.as_ref()
    }

    pub fn shape(&self) -> Vec<usize> {
        let mut shape = vec![];
        if let Some(altitude) = &self.altitude {
            shape.push(altitude.len());
        }
        shape.push(self.latitude.len());
        shape.push(self.longitude.len());
        shape
    }

    /// Whether the spatial coordinate of a variable is this grid.
    pub fn is_space_equal_to(&self, coordinate: &Grid) -> bool {
        self == coordinate
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.grid_name(), self.shape())
    }
}

fn regular_axis(
    name: &str,
    extent: (f64, f64),
    resolution: f64,
    span: [f64; 2],
) -> CouplingResult<GridAxis> {
    let (start, end) = extent;
    if resolution <= 0.0 || end <= start {
        return Err(CouplingError::InvalidDomain(format!(
            "{name} extent must be increasing and its resolution positive"
        )));
    }
    let cells = (end - start) / resolution;
    if !is_close!(cells, cells.round()) {
        return Err(CouplingError::InvalidDomain(format!(
            "{name} extent ({start}, {end}) is not a multiple of the resolution {resolution}"
        )));
    }

    let offset = 0.5 - (span[0] + span[1]) / 2.0;
    let values: Vec<f64> = (0..cells.round() as usize)
        .map(|i| (i as f64 + offset) * resolution + start)
        .collect();
    let bounds = values
        .iter()
        .map(|v| [v + span[0] * resolution, v + span[1] * resolution])
        .collect();
    GridAxis::new(values, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(location: GridLocation) -> Grid {
        Grid::from_extent_and_resolution((51.0, 55.0), (-2.0, 1.0), 1.0, 1.0, location).unwrap()
    }

    #[test]
    fn test_centre() {
        let grid = grid(GridLocation::Centre);
        assert_eq!(grid.shape(), vec![4, 3]);
        assert_eq!(grid.longitude().values(), &[-1.5, -0.5, 0.5]);
        assert_eq!(grid.latitude().bounds()[0], [51.0, 52.0]);
        assert_eq!(grid.grid_name(), "LatLonGrid");
    }

    #[test]
    fn test_corner_locations() {
        let lower_left = grid(GridLocation::LowerLeft);
        assert_eq!(lower_left.latitude().values(), &[51.0, 52.0, 53.0, 54.0]);
        assert_eq!(lower_left.latitude().bounds()[0], [51.0, 52.0]);

        let upper_right = grid(GridLocation::UpperRight);
        assert_eq!(upper_right.latitude().values(), &[52.0, 53.0, 54.0, 55.0]);
        assert_eq!(upper_right.longitude().bounds()[2], [0.0, 1.0]);

        // All locations describe the same cells
        assert_eq!(
            lower_left.latitude().bounds(),
            upper_right.latitude().bounds()
        );
    }

    #[test]
    fn test_extent_not_divisible() {
        let result =
            Grid::from_extent_and_resolution((51.0, 55.0), (-2.0, 1.0), 1.5, 1.0, GridLocation::Centre);
        assert!(matches!(result, Err(CouplingError::InvalidDomain(_))));
    }

    #[test]
    fn test_latitude_out_of_range() {
        let result =
            Grid::from_extent_and_resolution((80.0, 100.0), (0.0, 1.0), 10.0, 1.0, GridLocation::Centre);
        assert!(result.is_err());
    }

    #[test]
    fn test_axis_validation() {
        assert!(GridAxis::new(vec![], vec![]).is_err());
        assert!(GridAxis::new(vec![0.5, 1.5], vec![[0.0, 1.0]]).is_err());
        assert!(GridAxis::new(vec![1.5, 0.5], vec![[1.0, 2.0], [0.0, 1.0]]).is_err());
        assert!(GridAxis::new(vec![0.5], vec![[1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_equality_is_tolerant() {
        let a = grid(GridLocation::Centre);
        let latitude = GridAxis::new(
            vec![51.5, 52.5, 53.5, 54.5 + 1e-12],
            vec![[51.0, 52.0], [52.0, 53.0], [53.0, 54.0], [54.0, 55.0]],
        )
        .unwrap();
        let b = Grid::latlon(latitude, a.longitude().clone()).unwrap();
        assert!(a.is_space_equal_to(&b));

        let c = grid(GridLocation::LowerLeft);
        assert!(!a.is_space_equal_to(&c));
    }

    #[test]
    fn test_rotated_and_altitude() {
        let a = grid(GridLocation::Centre);
        let pole = RotatedPole {
            grid_north_pole_latitude: 38.0,
            grid_north_pole_longitude: 190.0,
            earth_radius: 6_371_229.0,
        };
        let rotated =
            Grid::rotated(a.latitude().clone(), a.longitude().clone(), pole).unwrap();
        assert_eq!(rotated.grid_name(), "RotatedLatLonGrid");
        assert_ne!(rotated, a);

        let altitude = GridAxis::new(vec![0.5, 1.5], vec![[0.0, 1.0], [1.0, 2.0]]).unwrap();
        let layered = a.clone().with_altitude(altitude);
        assert_eq!(layered.shape(), vec![2, 4, 3]);
        assert_ne!(layered, a);
    }

    #[test]
    fn test_deserialised_grids_are_checked() {
        let grid = grid(GridLocation::Centre);
        let mut value = serde_json::to_value(&grid).unwrap();
        assert_eq!(serde_json::from_value::<Grid>(value.clone()).unwrap(), grid);

        value["latitude"]["bounds"][0] = serde_json::json!([100.0, 101.0]);
        assert!(serde_json::from_value::<Grid>(value.clone()).is_err());

        value["latitude"] = serde_json::json!({"values": [51.5, 52.5], "bounds": [[51.0, 52.0]]});
        assert!(serde_json::from_value::<Grid>(value).is_err());

        let axis = r#"{"values": [1.5, 0.5], "bounds": [[1.0, 2.0], [0.0, 1.0]]}"#;
        assert!(serde_json::from_str::<GridAxis>(axis).is_err());
    }

    #[test]
    fn test_mesh_is_not_a_grid() {
        let mesh = SpaceDomain::Mesh { cell_count: 10 };
        assert!(mesh.as_grid().is_none());
        assert_eq!(mesh.name(), "Mesh");

        let domain: SpaceDomain = grid(GridLocation::Centre).into();
        assert!(domain.as_grid().is_some());
    }

    #[test]
    fn test_serialise() {
        let domain: SpaceDomain = grid(GridLocation::Centre).into();
        let serialised = serde_json::to_string(&domain).unwrap();
        let deserialised: SpaceDomain = serde_json::from_str(&serialised).unwrap();
        assert_eq!(domain, deserialised);
    }
}
