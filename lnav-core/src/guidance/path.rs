//! Path primitives shared by legs and transitions.

use math::{Angle, Heading, LatLong, Length, Speed, TurnDirection, bank_angle_for_radius};
use serde::Serialize;
use smallvec::SmallVec;

use super::common::COURSE_CHANGE_THRESHOLD;
use super::{AircraftState, GuidanceParameters};


/// Intersections further than this are treated as nonexistent.
const MAX_INTERCEPT_RANGE: Length = Length::from_nm(1000.);

/// A drawable piece of the predicted path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PathVector {
    Line {
        start: LatLong,
        end:   LatLong,
    },
    Arc {
        start:  LatLong,
        centre: LatLong,
        end:    LatLong,
        radius: Length,
        /// Positive for clockwise arcs.
        sweep:  Angle,
    },
}

pub type PathVectors = SmallVec<[PathVector; 4]>;

/// A great circle segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightPath {
    pub start:        LatLong,
    pub end:          LatLong,
    /// Initial course at `start`.
    pub course:       Heading,
    /// Course on arrival at `end`.
    pub final_course: Heading,
    pub length:       Length,
}

impl StraightPath {
    #[must_use]
    pub fn new(start: LatLong, end: LatLong) -> Self {
        Self {
            start,
            end,
            course: start.bearing_to(end),
            final_course: start.final_bearing_to(end),
            length: start.distance_to(end),
        }
    }

    #[must_use]
    pub fn from_course(start: LatLong, course: Heading, length: Length) -> Self {
        let end = start.destination(course, length);
        Self { start, end, course, final_course: start.final_bearing_to(end), length }
    }

    #[must_use]
    pub fn along_track_distance(&self, position: LatLong) -> Length {
        position.along_track_distance(self.start, self.course)
    }

    #[must_use]
    pub fn distance_to_go(&self, position: LatLong) -> Length {
        self.length - self.along_track_distance(position)
    }

    #[must_use]
    pub fn is_abeam(&self, position: LatLong) -> bool {
        let along = self.along_track_distance(position);
        along >= Length::ZERO && along <= self.length
    }

    #[must_use]
    pub fn guidance(&self, state: &AircraftState) -> GuidanceParameters {
        let cross_track_error = -state.position.cross_track_distance(self.start, self.course);

        let along = self.along_track_distance(state.position).max(Length::ZERO);
        let desired_track = if self.length - along > Length::from_nm(0.01) {
            self.start.destination(self.course, along).bearing_to(self.end)
        } else {
            self.final_course
        };

        GuidanceParameters::LateralPath {
            cross_track_error,
            track_angle_error: desired_track - state.true_track,
            phi_command: Angle::ZERO,
        }
    }

    /// The point `distance` before `end`, if it lies on the segment.
    #[must_use]
    pub fn point_before_end(&self, distance: Length) -> Option<LatLong> {
        if distance.is_negative() || distance > self.length {
            return None;
        }
        Some(self.start.destination(self.course, self.length - distance))
    }

    #[must_use]
    pub fn path_vector(&self) -> PathVector { PathVector::Line { start: self.start, end: self.end } }
}

/// A constant radius arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPath {
    pub centre:        LatLong,
    pub radius:        Length,
    /// Bearing from `centre` to `start`.
    pub start_bearing: Heading,
    /// Angle swept from `start` to `end`, positive for clockwise arcs.
    pub sweep:         Angle,
    pub start:         LatLong,
    pub end:           LatLong,
}

impl ArcPath {
    #[must_use]
    pub fn new(centre: LatLong, radius: Length, start_bearing: Heading, sweep: Angle) -> Self {
        Self {
            centre,
            radius,
            start_bearing,
            sweep,
            start: centre.destination(start_bearing, radius),
            end: centre.destination(start_bearing + sweep, radius),
        }
    }

    /// Arc around `centre` from the radial through `from` to the radial through `to`.
    #[must_use]
    pub fn between(
        centre: LatLong,
        radius: Length,
        from: LatLong,
        to: LatLong,
        direction: TurnDirection,
    ) -> Self {
        let start_bearing = centre.bearing_to(from);
        let sweep = start_bearing.distance(centre.bearing_to(to), direction);
        Self::new(centre, radius, start_bearing, sweep)
    }

    #[must_use]
    pub fn direction(&self) -> TurnDirection {
        if self.sweep.is_negative() {
            TurnDirection::CounterClockwise
        } else {
            TurnDirection::Clockwise
        }
    }

    #[must_use]
    pub fn end_bearing(&self) -> Heading { self.start_bearing + self.sweep }

    #[must_use]
    pub fn length(&self) -> Length { self.sweep.arc_length(self.radius) }

    #[must_use]
    pub fn inbound_course(&self) -> Heading { self.start_bearing + Angle::RIGHT * self.direction() }

    #[must_use]
    pub fn outbound_course(&self) -> Heading { self.end_bearing() + Angle::RIGHT * self.direction() }

    /// Unsigned angle travelled from `start` to the radial through `position`,
    /// in the range `[0, FULL)`.
    fn raw_travelled(&self, position: LatLong) -> Angle {
        self.start_bearing.distance(self.centre.bearing_to(position), self.direction()).abs()
    }

    /// Angle travelled along the arc, clamped to `[0, |sweep|]`.
    ///
    /// Radials outside the arc are attributed to whichever end is closer.
    fn travelled(&self, position: LatLong) -> Angle {
        let travelled = self.raw_travelled(position);
        let total = self.sweep.abs();
        if travelled <= total {
            travelled
        } else if travelled - total < (Angle::FULL - total) / 2. {
            total
        } else {
            Angle::ZERO
        }
    }

    #[must_use]
    pub fn distance_to_go(&self, position: LatLong) -> Length {
        (self.sweep.abs() - self.travelled(position)).arc_length(self.radius)
    }

    #[must_use]
    pub fn is_abeam(&self, position: LatLong) -> bool {
        self.raw_travelled(position) <= self.sweep.abs()
    }

    #[must_use]
    pub fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle {
        bank_angle_for_radius(ground_speed, self.radius) * self.direction()
    }

    #[must_use]
    pub fn guidance(&self, state: &AircraftState, phi_command: Angle) -> GuidanceParameters {
        let direction = self.direction();
        let distance_from_centre = self.centre.distance_to(state.position);
        let desired_track =
            self.centre.bearing_to(state.position) + Angle::RIGHT * direction;

        GuidanceParameters::LateralPath {
            cross_track_error: (distance_from_centre - self.radius) * direction.sign(),
            track_angle_error: desired_track - state.true_track,
            phi_command,
        }
    }

    /// The point `distance` before `end`, if it lies on the arc.
    #[must_use]
    pub fn point_before_end(&self, distance: Length) -> Option<LatLong> {
        if distance.is_negative() || distance > self.length() {
            return None;
        }
        let angle = Angle::from_radians(distance.into_nm() / self.radius.into_nm());
        Some(self.centre.destination(self.end_bearing() - angle * self.direction(), self.radius))
    }

    #[must_use]
    pub fn path_vector(&self) -> PathVector {
        PathVector::Arc {
            start:  self.start,
            centre: self.centre,
            end:    self.end,
            radius: self.radius,
            sweep:  self.sweep,
        }
    }
}

/// One piece of a composite path.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::From)]
pub enum Segment {
    Line(StraightPath),
    Arc(ArcPath),
}

impl Segment {
    #[must_use]
    pub fn length(&self) -> Length {
        match self {
            Self::Line(line) => line.length,
            Self::Arc(arc) => arc.length(),
        }
    }

    #[must_use]
    pub fn end(&self) -> LatLong {
        match self {
            Self::Line(line) => line.end,
            Self::Arc(arc) => arc.end,
        }
    }

    #[must_use]
    pub fn distance_to_go(&self, position: LatLong) -> Length {
        match self {
            Self::Line(line) => line.distance_to_go(position),
            Self::Arc(arc) => arc.distance_to_go(position),
        }
    }

    #[must_use]
    pub fn is_abeam(&self, position: LatLong) -> bool {
        match self {
            Self::Line(line) => line.is_abeam(position),
            Self::Arc(arc) => arc.is_abeam(position),
        }
    }

    #[must_use]
    pub fn is_arc(&self) -> bool { matches!(self, Self::Arc(_)) }

    #[must_use]
    pub fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle {
        match self {
            Self::Line(_) => Angle::ZERO,
            Self::Arc(arc) => arc.nominal_roll_angle(ground_speed),
        }
    }

    /// Arcs shallower than the course change threshold are flown wings level.
    #[must_use]
    pub fn guidance(&self, state: &AircraftState) -> GuidanceParameters {
        match self {
            Self::Line(line) => line.guidance(state),
            Self::Arc(arc) => {
                let phi = if arc.sweep.abs() > COURSE_CHANGE_THRESHOLD {
                    arc.nominal_roll_angle(state.ground_speed)
                } else {
                    Angle::ZERO
                };
                arc.guidance(state, phi)
            }
        }
    }

    #[must_use]
    pub fn point_before_end(&self, distance: Length) -> Option<LatLong> {
        match self {
            Self::Line(line) => line.point_before_end(distance),
            Self::Arc(arc) => arc.point_before_end(distance),
        }
    }

    #[must_use]
    pub fn path_vector(&self) -> PathVector {
        match self {
            Self::Line(line) => line.path_vector(),
            Self::Arc(arc) => arc.path_vector(),
        }
    }
}

pub type Segments = SmallVec<[Segment; 4]>;

/// Chains turns and straight segments from a starting point and track.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    position: LatLong,
    track:    Heading,
    radius:   Length,
    segments: Segments,
}

impl PathBuilder {
    #[must_use]
    pub fn new(position: LatLong, track: Heading, radius: Length) -> Self {
        Self { position, track, radius, segments: SmallVec::new() }
    }

    #[must_use]
    pub fn position(&self) -> LatLong { self.position }

    #[must_use]
    pub fn track(&self) -> Heading { self.track }

    /// Turns in `direction` until the track reaches `target`.
    pub fn turn_to(&mut self, target: Heading, direction: TurnDirection) -> &mut Self {
        let sweep = self.track.distance(target, direction);
        if sweep.abs() < Angle::from_degrees(0.01) {
            return self;
        }

        let centre = self.position.destination(self.track + Angle::RIGHT * direction, self.radius);
        let arc = ArcPath::new(centre, self.radius, centre.bearing_to(self.position), sweep);
        self.position = arc.end;
        self.track = target;
        self.segments.push(arc.into());
        self
    }

    /// Flies straight on the current track for `length`.
    pub fn straight(&mut self, length: Length) -> &mut Self {
        if !length.is_positive() {
            return self;
        }

        let line = StraightPath::from_course(self.position, self.track, length);
        self.position = line.end;
        self.track = line.final_course;
        self.segments.push(line.into());
        self
    }

    /// Flies straight to `end`.
    pub fn line_to(&mut self, end: LatLong) -> &mut Self {
        let line = StraightPath::new(self.position, end);
        if !line.length.is_positive() {
            return self;
        }

        self.position = line.end;
        self.track = line.final_course;
        self.segments.push(line.into());
        self
    }

    /// Where the current track meets the great circle through `point` with `course`,
    /// if the meeting point is ahead within a reasonable range.
    #[must_use]
    pub fn intersection_with(&self, point: LatLong, course: Heading) -> Option<LatLong> {
        let meet = self.position.intersection(self.track, point, course)?;
        (self.position.distance_to(meet) < MAX_INTERCEPT_RANGE).then_some(meet)
    }

    #[must_use]
    pub fn build(self) -> Segments { self.segments }
}

/// A sequence of segments flown one after another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentChain {
    segments: Segments,
    current:  usize,
}

impl SegmentChain {
    #[must_use]
    pub fn new(segments: Segments) -> Self { Self { segments, current: 0 } }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.segments.is_empty() }

    #[must_use]
    pub fn segments(&self) -> &[Segment] { &self.segments }

    /// Index of the segment being flown.
    #[must_use]
    pub fn current_index(&self) -> usize { self.current }

    fn current(&self) -> Option<&Segment> { self.segments.get(self.current) }

    /// Moves on to the next segment once the current one is complete.
    pub fn update_state(&mut self, position: LatLong) {
        if let Some(segment) = self.current()
            && !segment.distance_to_go(position).is_positive()
            && self.current + 1 < self.segments.len()
        {
            self.current += 1;
        }
    }

    #[must_use]
    pub fn guidance(&self, state: &AircraftState) -> Option<GuidanceParameters> {
        Some(self.current()?.guidance(state))
    }

    #[must_use]
    pub fn distance_to_go(&self, position: LatLong) -> Option<Length> {
        let current = self.current()?;
        let following: Length =
            self.segments[self.current + 1..].iter().map(Segment::length).sum();

        let mut remaining = current.distance_to_go(position);
        if !following.is_zero() {
            remaining = remaining.max(Length::ZERO);
        }
        Some(remaining + following)
    }

    #[must_use]
    pub fn is_abeam(&self, position: LatLong) -> bool {
        self.current().is_some_and(|segment| segment.is_abeam(position))
    }

    #[must_use]
    pub fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle {
        self.current().map_or(Angle::ZERO, |segment| segment.nominal_roll_angle(ground_speed))
    }

    #[must_use]
    pub fn is_arc(&self) -> bool { self.current().is_some_and(Segment::is_arc) }

    /// The arc being flown, or the next arc of the chain.
    #[must_use]
    pub fn current_arc(&self) -> Option<&ArcPath> {
        self.segments.get(self.current..)?.iter().find_map(|segment| match segment {
            Segment::Arc(arc) => Some(arc),
            Segment::Line(_) => None,
        })
    }

    #[must_use]
    pub fn length(&self) -> Length { self.segments.iter().map(Segment::length).sum() }

    #[must_use]
    pub fn end(&self) -> Option<LatLong> { self.segments.last().map(Segment::end) }

    #[must_use]
    pub fn path_vectors(&self) -> PathVectors {
        self.segments.iter().map(Segment::path_vector).collect()
    }
}
