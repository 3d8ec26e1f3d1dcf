use super::error::ModelError;
use crate::config::SheetLayout;
use crate::normalize::normalize_key;
use crate::workbook::{cell_ref, Sheet};
use std::collections::HashMap;
use std::fmt;

/// One scored column of a model sheet: a categorical field and the
/// coefficient applied for each of its modalities.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub label: String,
    /// Source column, only used to keep display and evaluation order stable
    pub column: usize,
    modalities: Vec<String>,
    values: HashMap<String, f64>,
}

impl Feature {
    /// Build a feature from (modality, coefficient) pairs. Modalities are
    /// normalized; a repeated modality keeps the last coefficient.
    pub fn new<I, K>(name: impl Into<String>, label: impl Into<String>, column: usize, values: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: fmt::Display,
    {
        let mut feature = Self {
            name: name.into(),
            label: label.into(),
            column,
            modalities: Vec::new(),
            values: HashMap::new(),
        };
        for (modality, coefficient) in values {
            feature.insert(normalize_key(&modality), coefficient);
        }
        feature
    }

    /// Read the feature rooted at `column` of `sheet`.
    ///
    /// Modalities are read downward from `layout.values_start_row` until the
    /// first blank cell; the coefficient is the cell to the right and must be
    /// numeric.
    pub fn from_sheet(sheet: &Sheet, column: usize, layout: &SheetLayout) -> Result<Self, ModelError> {
        let name = sheet.cell(layout.header_row, column).to_string();
        let label = sheet.cell(layout.label_row, column).to_string();
        let mut feature = Self::new(name, label, column, std::iter::empty::<(String, f64)>());

        for row in layout.values_start_row..sheet.height() {
            let modality = sheet.cell(row, column);
            if modality.is_empty() {
                break;
            }

            let coefficient_cell = sheet.cell(row, column + 1);
            let coefficient =
                coefficient_cell
                    .as_f64()
                    .ok_or_else(|| ModelError::InvalidCoefficient {
                        model: sheet.name.clone(),
                        feature: feature.name.clone(),
                        cell: cell_ref(row, column + 1),
                        value: coefficient_cell.to_string(),
                    })?;

            feature.insert(normalize_key(modality), coefficient);
        }

        Ok(feature)
    }

    fn insert(&mut self, key: String, coefficient: f64) {
        if self.values.insert(key.clone(), coefficient).is_none() {
            self.modalities.push(key);
        }
    }

    /// Coefficient for a raw value, normalizing it first.
    pub fn coefficient<T: fmt::Display + ?Sized>(&self, value: &T) -> Option<f64> {
        self.values.get(&normalize_key(value)).copied()
    }

    /// (modality, coefficient) pairs in sheet order.
    pub fn modalities(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.modalities
            .iter()
            .map(|m| (m.as_str(), self.values[m]))
    }

    pub fn len(&self) -> usize {
        self.modalities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modalities.is_empty()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t{} : {}", self.name, self.label)?;
        for (modality, coefficient) in self.modalities() {
            writeln!(f, "\t\t{} -> {}", modality, coefficient)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SheetLayout {
        SheetLayout::default()
    }

    fn age_sheet() -> Sheet {
        Sheet::from_grid(
            "AUTO",
            &[
                &[],
                &["", "Base", "2"],
                &[],
                &["", "", "", "AGE", "", "ZONE"],
                &[],
                &["", "", "", "Age band", "", "Zone"],
                &["", "", "", "young", "0.5", "Île-de-France", "1.3"],
                &["", "", "", "Old", "1.5", "Rural", "0.9"],
                &["", "", "", "", "", "Côte", "1.1"],
                &["", "", "", "ignored", "9"],
            ],
        )
    }

    #[test]
    fn test_from_sheet_reads_name_label_and_values() {
        let feature = Feature::from_sheet(&age_sheet(), 3, &layout()).unwrap();
        assert_eq!(feature.name, "AGE");
        assert_eq!(feature.label, "Age band");
        assert_eq!(feature.column, 3);
        let values: Vec<_> = feature.modalities().collect();
        assert_eq!(values, vec![("YOUNG", 0.5), ("OLD", 1.5)]);
    }

    #[test]
    fn test_blank_modality_ends_block() {
        // rows after the first blank are not part of the feature
        let feature = Feature::from_sheet(&age_sheet(), 3, &layout()).unwrap();
        assert_eq!(feature.len(), 2);
        assert!(feature.coefficient("ignored").is_none());

        // a neighbouring feature may have a longer block
        let zone = Feature::from_sheet(&age_sheet(), 5, &layout()).unwrap();
        assert_eq!(zone.len(), 3);
    }

    #[test]
    fn test_lookup_is_normalized() {
        let zone = Feature::from_sheet(&age_sheet(), 5, &layout()).unwrap();
        assert_eq!(zone.coefficient("ILE-DE-FRANCE"), Some(1.3));
        assert_eq!(zone.coefficient("île-de-france"), Some(1.3));
        assert_eq!(zone.coefficient("cote"), Some(1.1));
        assert_eq!(zone.coefficient("Urban"), None);
    }

    #[test]
    fn test_numeric_modalities() {
        let sheet = Sheet::from_grid(
            "S",
            &[&[], &[], &[], &["CV"], &[], &["Horsepower"], &["4", "0.8"], &["5", "1"]],
        );
        let feature = Feature::from_sheet(&sheet, 0, &layout()).unwrap();
        assert_eq!(feature.coefficient(&4), Some(0.8));
        assert_eq!(feature.coefficient("5"), Some(1.0));
    }

    #[test]
    fn test_missing_coefficient_is_error() {
        let sheet = Sheet::from_grid(
            "HOME",
            &[&[], &[], &[], &["ROOMS"], &[], &["Rooms"], &["1", "0.9"], &["2"]],
        );
        let err = Feature::from_sheet(&sheet, 0, &layout()).unwrap_err();
        match err {
            ModelError::InvalidCoefficient {
                model,
                feature,
                cell,
                value,
            } => {
                assert_eq!(model, "HOME");
                assert_eq!(feature, "ROOMS");
                assert_eq!(cell, "B8");
                assert_eq!(value, "");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_coefficient_is_error() {
        let sheet = Sheet::from_grid(
            "HOME",
            &[&[], &[], &[], &["ROOMS"], &[], &["Rooms"], &["1", "n/a"]],
        );
        let err = Feature::from_sheet(&sheet, 0, &layout()).unwrap_err();
        assert!(err.to_string().contains("'n/a'"));
        assert!(err.to_string().contains("B7"));
    }

    #[test]
    fn test_repeated_modality_keeps_last() {
        let feature = Feature::new("AGE", "", 0, [("young", 0.5), ("YOUNG", 0.7)]);
        assert_eq!(feature.len(), 1);
        assert_eq!(feature.coefficient("young"), Some(0.7));
    }

    #[test]
    fn test_display() {
        let feature = Feature::new("AGE", "Age band", 0, [("young", 0.5), ("old", 1.5)]);
        assert_eq!(
            feature.to_string(),
            "\tAGE : Age band\n\t\tYOUNG -> 0.5\n\t\tOLD -> 1.5\n"
        );
    }
}
