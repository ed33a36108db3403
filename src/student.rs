//! The roster entity.

/// A named entry of the roster together with the number of times it has been selected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Student {
    /// The unique name of the student.
    pub name: String,
    /// How many times the student has been selected so far.
    pub count: u64,
}

impl Student {
    /// Creates a new [`Student`].
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

impl<N: Into<String>> From<(N, u64)> for Student {
    fn from((name, count): (N, u64)) -> Self {
        Self::new(name, count)
    }
}
