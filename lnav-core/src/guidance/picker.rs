//! Selection of the transition joining two legs.

use math::Heading;

use super::leg::{self, Leg};
use super::transition::{
    CourseCaptureTransition, DirectToFixTransition, FixedRadiusTransition, HoldEntryTransition,
    PathCaptureTransition, Transition,
};
use super::GuidanceError;
use crate::guidance::common::COURSE_CHANGE_THRESHOLD;


/// Broad classes of legs that share transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Initial,
    /// Straight track ending at a fix: TF and DF.
    Track,
    /// Arc ending at a fix: RF and AF.
    Arc,
    /// Course ending at a floating point: CA and CR.
    Course,
    Heading,
    Hold,
}

fn shape(leg: &Leg) -> Shape {
    match leg.kind {
        leg::Kind::If(_) => Shape::Initial,
        leg::Kind::Tf(_) | leg::Kind::Df(_) => Shape::Track,
        leg::Kind::Rf(_) | leg::Kind::Af(_) => Shape::Arc,
        leg::Kind::Ca(_) | leg::Kind::Cr(_) => Shape::Course,
        leg::Kind::Vm(_) => Shape::Heading,
        leg::Kind::Hold(_) => Shape::Hold,
    }
}

/// Course of a leg that does not depend on its computed geometry.
fn static_course(leg: &Leg, outbound: bool) -> Option<Heading> {
    match &leg.kind {
        leg::Kind::Tf(tf) => {
            let path = tf.path();
            Some(if outbound { path.final_course } else { path.course })
        }
        leg::Kind::Ca(ca) => Some(ca.course),
        leg::Kind::Cr(cr) => Some(cr.course),
        leg::Kind::Vm(vm) => Some(vm.heading),
        _ => None,
    }
}

/// Picks the transition from `prev` to `next`.
///
/// Returns `Ok(None)` if the legs join without a transition.
/// A course change below 3° between two statically known courses also joins directly.
pub fn pick(prev: &Leg, next: &Leg) -> Result<Option<Transition>, GuidanceError> {
    if let (Some(from), Some(to)) = (static_course(prev, true), static_course(next, false))
        && (to - from).abs() < COURSE_CHANGE_THRESHOLD
    {
        return Ok(None);
    }

    let index = prev.index;
    let unsupported = || GuidanceError::UnsupportedLegSequence {
        index,
        from: prev.leg_type(),
        to: next.leg_type(),
    };

    let transition = match (shape(prev), &next.kind) {
        (_, leg::Kind::If(_)) | (Shape::Initial, _) => return Ok(None),

        (Shape::Track, leg::Kind::Tf(_)) => Transition::new(index, FixedRadiusTransition::default()),
        (Shape::Arc, leg::Kind::Tf(_) | leg::Kind::Rf(_) | leg::Kind::Af(_))
        | (Shape::Track, leg::Kind::Rf(_) | leg::Kind::Af(_)) => return Ok(None),
        (Shape::Course, leg::Kind::Tf(_)) => Transition::new(index, PathCaptureTransition::default()),
        (Shape::Hold, leg::Kind::Tf(_)) => Transition::new(index, CourseCaptureTransition::default()),
        (Shape::Course | Shape::Heading | Shape::Hold, leg::Kind::Rf(_) | leg::Kind::Af(_))
        | (Shape::Heading, leg::Kind::Tf(_)) => return Err(unsupported()),

        (_, leg::Kind::Df(_)) => Transition::new(index, DirectToFixTransition::default()),

        (_, leg::Kind::Ca(_) | leg::Kind::Vm(_)) => {
            Transition::new(index, PathCaptureTransition::default())
        }
        (Shape::Track | Shape::Arc | Shape::Course, leg::Kind::Cr(_)) => {
            Transition::new(index, PathCaptureTransition::default())
        }
        (Shape::Heading | Shape::Hold, leg::Kind::Cr(_)) => return Err(unsupported()),

        (Shape::Track | Shape::Arc, leg::Kind::Hold(_)) => {
            Transition::new(index, HoldEntryTransition::default())
        }
        (Shape::Course | Shape::Heading | Shape::Hold, leg::Kind::Hold(_)) => {
            return Err(unsupported());
        }
    };
    Ok(Some(transition))
}
