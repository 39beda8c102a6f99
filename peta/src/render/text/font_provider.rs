use std::sync::Arc;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use log::debug;

use super::FontWeight;

/// Font faces available for text rendering, backed by a `fontdb` database.
pub struct FontProvider {
    db: Database,
}

impl FontProvider {
    /// Creates an empty provider. Faces must be added with [`FontProvider::load_font_data`].
    pub fn empty() -> Self {
        Self {
            db: Database::new(),
        }
    }

    /// Creates a provider with all fonts installed in the system.
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        debug!("Loaded {} system font faces", db.len());
        Self { db }
    }

    /// Adds faces from the contents of a font file (TTF, OTF or a collection).
    pub fn load_font_data(&mut self, font_data: Vec<u8>) {
        self.db.load_font_data(font_data);
    }

    /// Returns true if no faces are loaded.
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Finds the face that matches the families and weight best, falling back to any sans-serif face and then to
    /// any face at all. Returns the font data and the face index inside it.
    pub fn best_match(
        &self,
        font_families: &[String],
        weight: FontWeight,
    ) -> Option<(Arc<Vec<u8>>, u32)> {
        let mut families: Vec<Family> = font_families.iter().map(|f| Family::Name(f)).collect();
        families.push(Family::SansSerif);

        let query = Query {
            families: &families,
            weight: Weight(weight.0),
            stretch: Stretch::Normal,
            style: Style::Normal,
        };

        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|face| face.id))?;

        self.db
            .with_face_data(id, |data, index| (Arc::new(data.to_vec()), index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_provider_has_no_match() {
        let provider = FontProvider::empty();
        assert!(provider.is_empty());
        assert!(provider
            .best_match(&["DejaVu Sans".to_string()], FontWeight::BOLD)
            .is_none());
    }

    #[test]
    fn invalid_font_data_is_ignored() {
        let mut provider = FontProvider::empty();
        provider.load_font_data(b"definitely not a font".to_vec());
        assert!(provider.is_empty());
    }
}
