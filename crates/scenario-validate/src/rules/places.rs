//! Places of interest, coordinates and place references

use super::{ensure, is_blank};
use crate::error::{RuleResult, ValidationFailure};
use crate::validator::Validator;
use scenario_model::{
    AreaRef, Coordinate, CoordinateType, PathRef, PlaceOfInterest, PointRef, Segment,
    StartLocation,
};

/// Point must have coordinates, of any type
pub(crate) const ANY_COORDINATE: &[CoordinateType] = &[];

/// Coordinate types refused where VBS needs GCC
pub(crate) const GCC_ONLY: &[CoordinateType] = &[CoordinateType::Agl, CoordinateType::Gdc];

/// Coordinate types refused where VBS needs AGL
pub(crate) const AGL_ONLY: &[CoordinateType] = &[CoordinateType::Gcc, CoordinateType::Gdc];

pub(crate) fn check_coordinate(coordinate: &Coordinate) -> RuleResult {
    if coordinate.is_complete() {
        Ok(())
    } else {
        Err(ValidationFailure::invalid(format!(
            "{} contains a null value",
            coordinate.coordinate_type().label()
        )))
    }
}

pub(crate) fn check_start_location(start: &StartLocation) -> RuleResult {
    let coordinate = start
        .coordinate
        .as_ref()
        .ok_or_else(|| ValidationFailure::invalid("Start location coordinate is null"))?;
    check_coordinate(coordinate)
}

fn check_segment(segment: &Segment) -> RuleResult {
    ensure(!is_blank(&segment.name), "Segment is missing a name")?;
    ensure(
        segment.width.is_some_and(|width| width >= 0.01),
        "Segment width is null or less than 0.01",
    )?;
    if let Some(buffer) = segment.buffer_width_percent {
        ensure(buffer >= 0.0, "Segment buffer width percent is less than 0")?;
    }
    let start = segment
        .start
        .as_ref()
        .ok_or_else(|| ValidationFailure::invalid("Segment start is null or contains no coordinate"))?;
    let end = segment
        .end
        .as_ref()
        .ok_or_else(|| ValidationFailure::invalid("Segment end is null or contains no coordinate"))?;
    check_coordinate(start)?;
    check_coordinate(end)
}

/// Rules of a single point, path or area
pub(crate) fn check_place_of_interest(place: &PlaceOfInterest) -> RuleResult {
    match place {
        PlaceOfInterest::Point { name, coordinate } => {
            ensure(!is_blank(name), "Point is missing a name")?;
            let coordinate = coordinate
                .as_ref()
                .ok_or_else(|| ValidationFailure::invalid("Point coordinate is null"))?;
            check_coordinate(coordinate)
        }
        PlaceOfInterest::Path { name, segments } => {
            ensure(!is_blank(name), "Path is missing a name")?;
            ensure(!segments.is_empty(), "Path must contain at least two points")?;
            for (index, segment) in segments.iter().enumerate() {
                check_segment(segment)
                    .map_err(|failure| failure.with_context(format_args!("Segment {index}: ")))?;
            }
            Ok(())
        }
        PlaceOfInterest::Area { name, coordinates } => {
            ensure(!is_blank(name), "Area is missing a name")?;
            ensure(coordinates.len() >= 3, "Area must have three or more points")?;
            coordinates.iter().try_for_each(check_coordinate)
        }
    }
}

impl Validator<'_> {
    pub(crate) fn check_places_of_interest(&self) -> RuleResult {
        self.doc
            .places_of_interest
            .iter()
            .try_for_each(check_place_of_interest)
    }

    /// Coordinate types to refuse for a VBS-restricted input, `None` elsewhere
    pub(crate) fn vbs_restriction(
        &self,
        restriction: &'static [CoordinateType],
    ) -> Option<&'static [CoordinateType]> {
        self.doc.is_vbs().then_some(restriction)
    }

    /// Reference to an existing point, optionally restricted by coordinate type
    pub(crate) fn check_point_ref(
        &self,
        point_ref: &PointRef,
        disallowed: Option<&[CoordinateType]>,
    ) -> RuleResult {
        if let Some(distance) = point_ref.distance {
            ensure(distance >= 0.0, "Point distance is less than 0")?;
        }
        ensure(!is_blank(&point_ref.value), "Point is missing a value")?;

        let Some(PlaceOfInterest::Point { name, coordinate }) =
            self.doc.place_of_interest(&point_ref.value)
        else {
            return Err(ValidationFailure::reference(
                "The point reference name doesn't refer to an existing point",
            ));
        };

        if let Some(disallowed) = disallowed {
            let coordinate = coordinate.as_ref().ok_or_else(|| {
                ValidationFailure::invalid(format!("The point '{name}' has no coordinates defined"))
            })?;
            let coordinate_type = coordinate.coordinate_type();
            if disallowed.contains(&coordinate_type) {
                return Err(ValidationFailure::invalid(format!(
                    "Point uses {} coordinates which are not allowed",
                    coordinate_type.label()
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn check_path_ref(&self, path_ref: Option<&PathRef>) -> RuleResult {
        let path_ref =
            path_ref.ok_or_else(|| ValidationFailure::invalid("The path reference cannot be null."))?;
        ensure(!is_blank(&path_ref.value), "Path is missing a value")?;
        match self.doc.place_of_interest(&path_ref.value) {
            Some(place) if place.is_path() => Ok(()),
            _ => Err(ValidationFailure::reference(
                "The path reference name doesn't refer to an existing path",
            )),
        }
    }

    pub(crate) fn check_area_ref(&self, area_ref: &AreaRef) -> RuleResult {
        ensure(!is_blank(&area_ref.value), "Area is missing a value")?;
        match self.doc.place_of_interest(&area_ref.value) {
            Some(place) if place.is_area() => Ok(()),
            _ => Err(ValidationFailure::reference(
                "The area reference name doesn't refer to an existing area",
            )),
        }
    }
}
