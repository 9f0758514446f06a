//! Encoding counters and encoding limits.
//!
//! MRD counters are optional and 32 bit wide, legacy counters are mandatory 16 bit values with a
//! fixed block of user counters. Absent counters become 0 on the legacy side; values are range
//! checked instead of truncated.

use crate::error::{check_capacity, narrow, Result};
use crate::ismrmrd::{self, USER_LIMITS};
use crate::mrd;

pub fn counters_to_mrd(idx: &ismrmrd::EncodingCounters) -> mrd::EncodingCounters {
    mrd::EncodingCounters {
        kspace_encode_step_1: Some(idx.kspace_encode_step_1.into()),
        kspace_encode_step_2: Some(idx.kspace_encode_step_2.into()),
        average: Some(idx.average.into()),
        slice: Some(idx.slice.into()),
        contrast: Some(idx.contrast.into()),
        phase: Some(idx.phase.into()),
        repetition: Some(idx.repetition.into()),
        set: Some(idx.set.into()),
        segment: Some(idx.segment.into()),
        user: idx.user.iter().map(|&u| u.into()).collect(),
    }
}

fn counter(field: &'static str, value: Option<u32>) -> Result<u16> {
    narrow(field, value.unwrap_or(0))
}

pub fn counters_to_ismrmrd(idx: &mrd::EncodingCounters) -> Result<ismrmrd::EncodingCounters> {
    check_capacity("user encoding counters", idx.user.len(), USER_LIMITS)?;
    let mut user = [0u16; USER_LIMITS];
    for (slot, &value) in user.iter_mut().zip(&idx.user) {
        *slot = narrow("user encoding counter", value)?;
    }
    Ok(ismrmrd::EncodingCounters {
        kspace_encode_step_1: counter("kspace_encode_step_1", idx.kspace_encode_step_1)?,
        kspace_encode_step_2: counter("kspace_encode_step_2", idx.kspace_encode_step_2)?,
        average: counter("average", idx.average)?,
        slice: counter("slice", idx.slice)?,
        contrast: counter("contrast", idx.contrast)?,
        phase: counter("phase", idx.phase)?,
        repetition: counter("repetition", idx.repetition)?,
        set: counter("set", idx.set)?,
        segment: counter("segment", idx.segment)?,
        user,
    })
}

pub fn limit_to_mrd(limit: &ismrmrd::Limit) -> mrd::LimitType {
    mrd::LimitType {
        minimum: limit.minimum.into(),
        maximum: limit.maximum.into(),
        center: limit.center.into(),
    }
}

pub fn limit_to_ismrmrd(limit: &mrd::LimitType) -> Result<ismrmrd::Limit> {
    Ok(ismrmrd::Limit {
        minimum: narrow("limit minimum", limit.minimum)?,
        maximum: narrow("limit maximum", limit.maximum)?,
        center: narrow("limit center", limit.center)?,
    })
}

pub fn limits_to_mrd(limits: &ismrmrd::EncodingLimits) -> mrd::EncodingLimitsType {
    let map = |l: &Option<ismrmrd::Limit>| l.as_ref().map(limit_to_mrd);
    mrd::EncodingLimitsType {
        kspace_encoding_step_0: map(&limits.kspace_encoding_step_0),
        kspace_encoding_step_1: map(&limits.kspace_encoding_step_1),
        kspace_encoding_step_2: map(&limits.kspace_encoding_step_2),
        average: map(&limits.average),
        slice: map(&limits.slice),
        contrast: map(&limits.contrast),
        phase: map(&limits.phase),
        repetition: map(&limits.repetition),
        set: map(&limits.set),
        segment: map(&limits.segment),
        user: limits.user.iter().map(map).collect(),
    }
}

pub fn limits_to_ismrmrd(limits: &mrd::EncodingLimitsType) -> Result<ismrmrd::EncodingLimits> {
    let map = |l: &Option<mrd::LimitType>| l.as_ref().map(limit_to_ismrmrd).transpose();
    check_capacity("user encoding limits", limits.user.len(), USER_LIMITS)?;
    let mut user = [None; USER_LIMITS];
    for (slot, limit) in user.iter_mut().zip(&limits.user) {
        *slot = map(limit)?;
    }
    Ok(ismrmrd::EncodingLimits {
        kspace_encoding_step_0: map(&limits.kspace_encoding_step_0)?,
        kspace_encoding_step_1: map(&limits.kspace_encoding_step_1)?,
        kspace_encoding_step_2: map(&limits.kspace_encoding_step_2)?,
        average: map(&limits.average)?,
        slice: map(&limits.slice)?,
        contrast: map(&limits.contrast)?,
        phase: map(&limits.phase)?,
        repetition: map(&limits.repetition)?,
        set: map(&limits.set)?,
        segment: map(&limits.segment)?,
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn forward_counters_are_all_present() {
        let legacy = ismrmrd::EncodingCounters {
            kspace_encode_step_1: 12,
            slice: 3,
            user: [1, 2, 3, 4, 5, 6, 7, 8],
            ..Default::default()
        };
        let idx = counters_to_mrd(&legacy);
        assert_eq!(idx.kspace_encode_step_1, Some(12));
        assert_eq!(idx.kspace_encode_step_2, Some(0));
        assert_eq!(idx.slice, Some(3));
        assert_eq!(idx.user, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(counters_to_ismrmrd(&idx).unwrap(), legacy);
    }

    #[test]
    fn absent_counters_become_zero() {
        let idx = mrd::EncodingCounters {
            phase: Some(4),
            user: vec![9],
            ..Default::default()
        };
        let legacy = counters_to_ismrmrd(&idx).unwrap();
        assert_eq!(legacy.kspace_encode_step_1, 0);
        assert_eq!(legacy.average, 0);
        assert_eq!(legacy.segment, 0);
        assert_eq!(legacy.phase, 4);
        assert_eq!(legacy.user, [9, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn nine_user_counters_do_not_fit() {
        let idx = mrd::EncodingCounters {
            user: vec![0; 9],
            ..Default::default()
        };
        assert!(matches!(
            counters_to_ismrmrd(&idx),
            Err(Error::Cardinality { len: 9, capacity: 8, .. })
        ));
    }

    #[test]
    fn counter_overflow() {
        let idx = mrd::EncodingCounters {
            user: vec![65536],
            ..Default::default()
        };
        assert!(matches!(
            counters_to_ismrmrd(&idx),
            Err(Error::Overflow { value: 65536, .. })
        ));
        let idx = mrd::EncodingCounters {
            user: vec![65535],
            repetition: Some(70000),
            ..Default::default()
        };
        assert!(matches!(
            counters_to_ismrmrd(&idx),
            Err(Error::Overflow { field: "repetition", .. })
        ));
    }

    #[test]
    fn limits_keep_optionality() {
        let mut legacy = ismrmrd::EncodingLimits {
            slice: Some(ismrmrd::Limit { minimum: 0, maximum: 9, center: 4 }),
            ..Default::default()
        };
        legacy.user[5] = Some(ismrmrd::Limit { minimum: 1, maximum: 2, center: 1 });
        let limits = limits_to_mrd(&legacy);
        assert_eq!(limits.slice, Some(mrd::LimitType { minimum: 0, maximum: 9, center: 4 }));
        assert_eq!(limits.average, None);
        assert_eq!(limits.kspace_encoding_step_0, None);
        assert_eq!(limits.user.len(), USER_LIMITS);
        assert_eq!(limits.user[4], None);
        assert!(limits.user[5].is_some());
        assert_eq!(limits_to_ismrmrd(&limits).unwrap(), legacy);
    }

    #[test]
    fn limit_overflow() {
        let limits = mrd::EncodingLimitsType {
            segment: Some(mrd::LimitType { minimum: 0, maximum: 100_000, center: 0 }),
            ..Default::default()
        };
        assert!(matches!(limits_to_ismrmrd(&limits), Err(Error::Overflow { .. })));
        let limits = mrd::EncodingLimitsType {
            user: vec![None; 9],
            ..Default::default()
        };
        assert!(matches!(limits_to_ismrmrd(&limits), Err(Error::Cardinality { .. })));
    }
}
