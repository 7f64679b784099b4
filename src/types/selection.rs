use serde::{Deserialize, Deserializer, Serialize};

use super::lenient::lenient_u32;

/// A cell address as the outside world sees it: column label plus row index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAddr {
    pub col: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub row: u32,
}

impl CellAddr {
    pub fn new(col: impl Into<String>, row: u32) -> Self {
        Self {
            col: col.into(),
            row,
        }
    }
}

/// Rectangular selection state.
///
/// `start` is the anchor and `tmp` the live endpoint that rendering uses.
/// `end` stays empty while a drag is in progress and receives `tmp` when the
/// drag is committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub start: Option<CellAddr>,
    pub end: Option<CellAddr>,
    pub tmp: Option<CellAddr>,
}

impl Selection {
    /// A committed single-range selection.
    pub fn range(start: CellAddr, end: CellAddr) -> Self {
        Self {
            start: Some(start),
            tmp: Some(end.clone()),
            end: Some(end),
        }
    }

    /// Fill in a missing live endpoint from the anchor, as external setters expect.
    pub fn normalized(mut self) -> Self {
        if self.tmp.is_none() {
            self.tmp.clone_from(&self.start);
        }
        self
    }

    /// Anchor and live endpoint, when both are present.
    pub fn drawable(&self) -> Option<(&CellAddr, &CellAddr)> {
        match (&self.start, &self.tmp) {
            (Some(start), Some(tmp)) => Some((start, tmp)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.tmp.is_none()
    }
}

/// How pointer drags extend the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Free rectangular selection.
    #[default]
    Default,
    /// Whole rows; the column span always covers the full grid width.
    Row,
}

impl SelectionMode {
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("row") {
            Self::Row
        } else {
            Self::Default
        }
    }
}

impl<'de> Deserialize<'de> for SelectionMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map_or(Self::Default, Self::parse))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn missing_tmp_is_filled_from_start() {
        let sel: Selection = serde_json::from_str(r#"{"start":{"col":"B","row":3}}"#).unwrap();
        let sel = sel.normalized();
        assert_eq!(sel.tmp, Some(CellAddr::new("B", 3)));
        assert_eq!(sel.end, None);
        assert!(sel.drawable().is_some());
    }

    #[test]
    fn selection_serializes_nulls() {
        let json = serde_json::to_string(&Selection::default()).unwrap();
        assert_eq!(json, r#"{"start":null,"end":null,"tmp":null}"#);
    }

    #[test]
    fn selection_mode_is_lenient() {
        assert_eq!(serde_json::from_str::<SelectionMode>(r#""row""#).unwrap(), SelectionMode::Row);
        assert_eq!(
            serde_json::from_str::<SelectionMode>(r#""columns""#).unwrap(),
            SelectionMode::Default
        );
        assert_eq!(serde_json::from_str::<SelectionMode>("3").unwrap(), SelectionMode::Default);
    }
}
