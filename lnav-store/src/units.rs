//! Serde adapters between the human-facing units of the schema and [`math`] quantities.

/// Serializes a [`math::Heading`] as degrees in `0..360`.
pub mod degrees {
    use math::Heading;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes the heading as degrees.
    pub fn serialize<S: Serializer>(heading: &Heading, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(heading.degrees())
    }

    /// Deserializes a heading from any finite number of degrees.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Heading, D::Error> {
        let degrees = f64::deserialize(deserializer)?;
        if !degrees.is_finite() {
            return Err(serde::de::Error::custom("non-finite heading"));
        }
        Ok(Heading::from_degrees(degrees))
    }
}

/// Serializes a [`math::Length`] as feet.
pub mod feet {
    use math::Length;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes the length as feet.
    pub fn serialize<S: Serializer>(length: &Length, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(length.into_feet())
    }

    /// Deserializes a length from feet.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Length, D::Error> {
        let feet = f64::deserialize(deserializer)?;
        if !feet.is_finite() {
            return Err(serde::de::Error::custom("non-finite altitude"));
        }
        Ok(Length::from_feet(feet))
    }
}

/// Serializes a [`math::Speed`] as knots.
pub mod knots {
    use math::Speed;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes the speed as knots.
    pub fn serialize<S: Serializer>(speed: &Speed, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(speed.into_knots())
    }

    /// Deserializes a speed from knots.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Speed, D::Error> {
        let knots = f64::deserialize(deserializer)?;
        if !knots.is_finite() {
            return Err(serde::de::Error::custom("non-finite speed"));
        }
        Ok(Speed::from_knots(knots))
    }

    /// Same as the parent module, for optional speeds.
    pub mod option {
        use math::Speed;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serializes the speed as knots, or `null`.
        pub fn serialize<S: Serializer>(
            speed: &Option<Speed>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match speed {
                Some(speed) => serializer.serialize_some(&speed.into_knots()),
                None => serializer.serialize_none(),
            }
        }

        /// Deserializes an optional speed from knots.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Speed>, D::Error> {
            let knots = Option::<f64>::deserialize(deserializer)?;
            match knots {
                Some(knots) if !knots.is_finite() => {
                    Err(serde::de::Error::custom("non-finite speed"))
                }
                knots => Ok(knots.map(Speed::from_knots)),
            }
        }
    }
}
