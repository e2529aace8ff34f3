//! Settings persistence
//!
//! The document is a JSON object keyed by the template's label keys. Saving
//! writes every field; loading merges sub-field by sub-field so a document
//! carrying only `text` for a label leaves that label's position, size and
//! colors alone. A load either applies completely or not at all.

use crate::export::sanitize_file_stem;
use crate::layout::{DotField, FieldKey, FieldRef, LayoutConfig, Point, Size, SpriteField, TextField, TextKey};
use crate::{Color, Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Key used by older documents for the model label
const LEGACY_MODEL_KEY: &str = "title";

#[derive(Serialize)]
struct TextRecord<'a> {
    pos: Point,
    size: u32,
    fill: Color,
    outline: String,
    outline_width: u32,
    text: &'a str,
}

#[derive(Deserialize)]
struct TextPatch {
    pos: Option<Point>,
    size: Option<u32>,
    fill: Option<Color>,
    outline: Option<String>,
    outline_width: Option<u32>,
    text: Option<String>,
}

#[derive(Serialize)]
struct DotRecord {
    count: u32,
    pos: Point,
    size: u32,
    spacing: u32,
    per_row: u32,
    row_gap: u32,
}

#[derive(Deserialize)]
struct DotPatch {
    count: Option<i64>,
    pos: Option<Point>,
    size: Option<u32>,
    spacing: Option<u32>,
    per_row: Option<u32>,
    row_gap: Option<u32>,
}

#[derive(Serialize)]
struct SpriteRecord<'a> {
    path: Option<&'a str>,
    pos: Point,
    size: Size,
    aspect_ratio: f64,
}

#[derive(Deserialize)]
struct SpritePatch {
    // Outer `None`: key absent. `Some(None)`: explicit null.
    #[serde(default, deserialize_with = "present")]
    path: Option<Option<String>>,
    pos: Option<Point>,
    size: Option<Size>,
    aspect_ratio: Option<f64>,
}

fn present<'de, D>(d: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(d).map(Some)
}

impl TextPatch {
    fn apply(self, field: &mut TextField) -> Result<()> {
        if let Some(v) = self.pos {
            field.position = v;
        }
        if let Some(v) = self.size {
            field.font_size = v;
        }
        if let Some(v) = self.fill {
            field.fill = v;
        }
        if let Some(v) = self.outline {
            field.outline = Color::parse_optional(&v)?;
        }
        if let Some(v) = self.outline_width {
            field.outline_width = v;
        }
        if let Some(v) = self.text {
            field.set_text(&v);
        }
        Ok(())
    }
}

impl DotPatch {
    fn apply(self, field: &mut DotField) {
        if let Some(v) = self.count {
            field.set_count(v);
        }
        if let Some(v) = self.pos {
            field.position = v;
        }
        if let Some(v) = self.size {
            field.dot_size = v;
        }
        if let Some(v) = self.spacing {
            field.spacing = v;
        }
        if let Some(v) = self.per_row {
            field.per_row = v;
        }
        if let Some(v) = self.row_gap {
            field.row_gap = v;
        }
    }
}

impl SpritePatch {
    fn apply(self, field: &mut SpriteField) {
        if let Some(v) = self.path {
            field.source_path = v;
        }
        if let Some(v) = self.pos {
            field.position = v;
        }
        if let Some(v) = self.size {
            field.size = v;
        }
        if let Some(v) = self.aspect_ratio {
            field.aspect_ratio = v;
        }
    }
}

fn text_record(field: &TextField) -> Result<Value> {
    Ok(serde_json::to_value(TextRecord {
        pos: field.position,
        size: field.font_size,
        fill: field.fill,
        outline: field.outline.map(|c| c.to_string()).unwrap_or_default(),
        outline_width: field.outline_width,
        text: field.text(),
    })?)
}

fn dot_record(field: &DotField) -> Result<Value> {
    Ok(serde_json::to_value(DotRecord {
        count: field.count,
        pos: field.position,
        size: field.dot_size,
        spacing: field.spacing,
        per_row: field.per_row,
        row_gap: field.row_gap,
    })?)
}

fn sprite_record(field: &SpriteField) -> Result<Value> {
    Ok(serde_json::to_value(SpriteRecord {
        path: field.source_path.as_deref(),
        pos: field.position,
        size: field.size,
        aspect_ratio: field.aspect_ratio,
    })?)
}

fn merge_field(config: &mut LayoutConfig, key: FieldKey, raw: &Value) -> Result<()> {
    let context = |e: serde_json::Error| Error::Settings(format!("{}: {}", key.as_str(), e));
    match key {
        FieldKey::Text(k) => TextPatch::deserialize(raw).map_err(context)?.apply(config.text_mut(k)),
        FieldKey::Dots(t) => {
            DotPatch::deserialize(raw).map_err(context)?.apply(config.dots_mut(t));
            Ok(())
        }
        FieldKey::Sprite => {
            SpritePatch::deserialize(raw).map_err(context)?.apply(config.sprite_mut());
            Ok(())
        }
    }
}

/// Serializes and merge-loads `LayoutConfig` documents.
pub struct SettingsStore;

impl SettingsStore {
    /// Serialize every field, keyed by label, in template order.
    pub fn save(config: &LayoutConfig) -> Result<Value> {
        let mut doc = Map::new();
        for (key, field) in config.entries() {
            let record = match field {
                FieldRef::Text(f) => text_record(f)?,
                FieldRef::Dots(f) => dot_record(f)?,
                FieldRef::Sprite(f) => sprite_record(f)?,
            };
            doc.insert(key.to_string(), record);
        }
        Ok(Value::Object(doc))
    }

    /// Pretty JSON with four-space indentation
    pub fn to_string(config: &LayoutConfig) -> Result<String> {
        let doc = Self::save(config)?;
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        doc.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| Error::Other(e.to_string()))
    }

    /// Merge `doc` into `config`. Unknown keys are ignored; on any error the
    /// config is left exactly as it was.
    pub fn load(config: &mut LayoutConfig, doc: &Value) -> Result<()> {
        let map = doc
            .as_object()
            .ok_or_else(|| Error::Settings("document root must be an object".into()))?;

        let mut staged = config.clone();
        let model_key = TextKey::Model.as_str();
        for (key, raw) in map {
            let field_key = match FieldKey::from_key(key) {
                Some(k) => k,
                None if key == LEGACY_MODEL_KEY && !map.contains_key(model_key) => FieldKey::Text(TextKey::Model),
                None => {
                    log::debug!("Ignoring unknown settings key {:?}", key);
                    continue;
                }
            };
            merge_field(&mut staged, field_key, raw)?;
        }
        staged.validate()?;

        *config = staged;
        Ok(())
    }

    pub fn load_str(config: &mut LayoutConfig, s: &str) -> Result<()> {
        let doc: Value = serde_json::from_str(s)?;
        Self::load(config, &doc)
    }

    /// `<MODEL>_<NAME>.json`, with placeholders for empty labels
    pub fn default_file_name(config: &LayoutConfig) -> String {
        let label = |key: TextKey, fallback: &str| {
            let t = config.text(key).text().trim();
            if t.is_empty() {
                fallback.to_string()
            } else {
                sanitize_file_stem(t)
            }
        };
        format!("{}_{}.json", label(TextKey::Model, "UNTITLED"), label(TextKey::Name, "CARD"))
    }

    pub fn save_to_dir(config: &LayoutConfig, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(Self::default_file_name(config));
        std::fs::write(&path, Self::to_string(config)?)?;
        log::info!("Saved settings to {}", path.display());
        Ok(path)
    }

    pub fn load_from_path(config: &mut LayoutConfig, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)?;
        Self::load_str(config, &contents)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DotTrack;
    use serde_json::json;

    fn edited() -> LayoutConfig {
        let mut cfg = LayoutConfig::template();
        cfg.set_text(TextKey::Model, "as7-d");
        cfg.set_text(TextKey::Name, "atlas");
        cfg.set_text(TextKey::Pv, "52");
        cfg.text_mut(TextKey::Mv).outline = None;
        cfg.text_mut(TextKey::Sz).fill = Color::rgba(1, 2, 3, 4);
        cfg.dots_mut(DotTrack::Armor).set_count(14);
        cfg.dots_mut(DotTrack::Structure).per_row = 7;
        let sprite = cfg.sprite_mut();
        sprite.set_source("assets/mech_pics/atlas.png", 640, 480);
        sprite.set_width(333, true);
        sprite.position = Point::new(-10, 20);
        cfg
    }

    #[test]
    fn round_trip_reproduces_config() {
        let cfg = edited();
        let doc = SettingsStore::save(&cfg).unwrap();
        let mut loaded = LayoutConfig::template();
        SettingsStore::load(&mut loaded, &doc).unwrap();
        assert_eq!(loaded, cfg);

        let text = SettingsStore::to_string(&cfg).unwrap();
        let mut loaded = LayoutConfig::template();
        SettingsStore::load_str(&mut loaded, &text).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn aspect_ratios_survive_text_round_trip() {
        let mut mismatches = Vec::new();
        for w in 1..200u32 {
            for h in 1..200u32 {
                let mut cfg = LayoutConfig::template();
                cfg.sprite_mut().set_source("x.png", w, h);
                let text = SettingsStore::to_string(&cfg).unwrap();
                let mut loaded = LayoutConfig::template();
                SettingsStore::load_str(&mut loaded, &text).unwrap();
                if loaded != cfg {
                    mismatches.push((w, h));
                }
            }
        }
        assert!(mismatches.is_empty(), "{} mismatches, first {:?}", mismatches.len(), mismatches.first());
    }

    #[test]
    fn oversized_values_fail_the_whole_load() {
        let mut cfg = edited();
        let before = cfg.clone();
        for doc in [
            json!({ "name": { "size": 4000000000u32, "text": "a" } }),
            json!({ "name": { "text": "b" }, "Armor": { "count": 4294967295u32 } }),
            json!({ "Structure": { "per_row": 100000 } }),
            json!({ "MechImage": { "size": [100000, 10] } }),
            json!({ "PV": { "pos": [2147483647, 0] } }),
        ] {
            let err = SettingsStore::load(&mut cfg, &doc).unwrap_err();
            assert!(matches!(err, Error::Settings(_)), "{err}");
            assert_eq!(cfg, before);
        }
    }

    #[test]
    fn document_uses_template_keys_in_order() {
        let doc = SettingsStore::save(&edited()).unwrap();
        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.first().map(String::as_str), Some("model"));
        assert_eq!(keys.last().map(String::as_str), Some("MechImage"));
        assert_eq!(doc["name"]["pos"], json!([80, 145]));
        assert_eq!(doc["MV"]["outline"], json!(""));
        assert_eq!(doc["Armor"]["count"], json!(14));
        assert_eq!(doc["MechImage"]["size"], json!([333, 250]));
    }

    #[test]
    fn partial_document_merges_sub_fields() {
        let mut cfg = edited();
        let before = cfg.clone();
        SettingsStore::load(&mut cfg, &json!({ "name": { "text": "Marauder" } })).unwrap();
        assert_eq!(cfg.text(TextKey::Name).text(), "MARAUDER");
        assert_eq!(cfg.text(TextKey::Name).position, before.text(TextKey::Name).position);
        assert_eq!(cfg.text(TextKey::Name).fill, before.text(TextKey::Name).fill);
        assert_eq!(cfg.text(TextKey::Model), before.text(TextKey::Model));
        assert_eq!(cfg.sprite(), before.sprite());
    }

    #[test]
    fn sprite_path_null_clears_but_absent_keeps() {
        let mut cfg = edited();
        SettingsStore::load(&mut cfg, &json!({ "MechImage": { "pos": [1, 2] } })).unwrap();
        assert!(cfg.sprite().source_path.is_some());
        SettingsStore::load(&mut cfg, &json!({ "MechImage": { "path": null } })).unwrap();
        assert!(cfg.sprite().source_path.is_none());
        assert_eq!(cfg.sprite().position, Point::new(1, 2));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut cfg = edited();
        let before = cfg.clone();
        SettingsStore::load(&mut cfg, &json!({ "Heat": { "count": 3 }, "version": 2 })).unwrap();
        assert_eq!(cfg, before);
    }

    #[test]
    fn malformed_document_leaves_config_untouched() {
        let mut cfg = edited();
        let before = cfg.clone();

        assert!(SettingsStore::load_str(&mut cfg, "{ not json").is_err());
        assert!(SettingsStore::load(&mut cfg, &json!([1, 2, 3])).is_err());
        // Valid first entry, broken second: nothing may be applied.
        let err = SettingsStore::load(
            &mut cfg,
            &json!({ "name": { "text": "changed" }, "Armor": { "pos": "left" } }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Armor"));
        assert!(SettingsStore::load(&mut cfg, &json!({ "MV": { "fill": "#nothex" } })).is_err());
        assert!(SettingsStore::load(&mut cfg, &json!({ "Structure": { "per_row": 0 } })).is_err());
        assert_eq!(cfg, before);
    }

    #[test]
    fn negative_count_clamps_on_load() {
        let mut cfg = LayoutConfig::template();
        SettingsStore::load(&mut cfg, &json!({ "Armor": { "count": -3 } })).unwrap();
        assert_eq!(cfg.dots(DotTrack::Armor).count, 0);
    }

    #[test]
    fn legacy_title_key_maps_to_model() {
        let mut cfg = LayoutConfig::template();
        SettingsStore::load(&mut cfg, &json!({ "title": { "text": "old" } })).unwrap();
        assert_eq!(cfg.text(TextKey::Model).text(), "OLD");

        let mut cfg = LayoutConfig::template();
        SettingsStore::load(&mut cfg, &json!({ "title": { "text": "old" }, "model": { "text": "new" } })).unwrap();
        assert_eq!(cfg.text(TextKey::Model).text(), "NEW");
    }

    #[test]
    fn file_name_uses_model_and_name() {
        let cfg = edited();
        assert_eq!(SettingsStore::default_file_name(&cfg), "AS7-D_ATLAS.json");
        assert_eq!(SettingsStore::default_file_name(&LayoutConfig::template()), "UNTITLED_CARD.json");
    }

    #[test]
    fn save_and_load_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = edited();
        let path = SettingsStore::save_to_dir(&cfg, dir.path()).unwrap();
        assert!(path.ends_with("AS7-D_ATLAS.json"));
        let mut loaded = LayoutConfig::template();
        SettingsStore::load_from_path(&mut loaded, &path).unwrap();
        assert_eq!(loaded, cfg);
    }
}
