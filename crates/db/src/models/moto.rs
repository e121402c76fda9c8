//! Moto entity model and its write DTOs.
//!
//! The three DTOs map onto the write operations:
//!
//! | DTO          | Operation | Group  | `edicionLimitada` |
//! |--------------|-----------|--------|-------------------|
//! | `CreateMoto` | POST      | create | required          |
//! | `UpdateMoto` | PUT       | update | not a field       |
//! | `PatchMoto`  | PATCH     | update | not a field       |
//!
//! `PatchMoto` is merged onto the stored record and the result is validated
//! as an `UpdateMoto`. Because neither update DTO declares `edicion_limitada`,
//! a client-sent value is dropped during deserialization.

use motos_core::audit::Auditable;
use motos_core::error::CoreError;
use motos_core::moto::{validate_tipo, MotoTipo, MAX_EXTRAS, MAX_MARCA_LEN, MAX_MODELO_LEN};
use motos_core::types::{DbId, Timestamp};
use motos_core::validation::{into_text_items, validate_not_blank, validate_text_items};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `motos` table, or a record about to be written to it.
///
/// `id`, `created_at` and `updated_at` are `None` only before the first
/// save; rows read back from storage always carry all three.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Moto {
    pub id: Option<DbId>,
    pub modelo: String,
    pub cilindrada: i32,
    pub marca: String,
    #[sqlx(try_from = "String")]
    pub tipo: MotoTipo,
    #[sqlx(json)]
    pub extras: Vec<String>,
    pub peso: Option<i32>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub edicion_limitada: bool,
}

impl Auditable for Moto {
    fn is_new(&self) -> bool {
        self.id.is_none()
    }

    fn set_created_at(&mut self, at: Timestamp) {
        self.created_at = Some(at);
    }

    fn set_updated_at(&mut self, at: Timestamp) {
        self.updated_at = Some(at);
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST payload. Required fields are `Option` so that a missing field is
/// reported as a `required` violation alongside every other failure.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMoto {
    #[validate(
        required,
        length(max = MAX_MODELO_LEN, message = "must be at most 50 characters"),
        custom(function = "validate_not_blank")
    )]
    pub modelo: Option<String>,

    #[validate(required, range(min = 1, message = "must be positive"))]
    pub cilindrada: Option<i32>,

    #[validate(
        required,
        length(max = MAX_MARCA_LEN, message = "must be at most 40 characters"),
        custom(function = "validate_not_blank")
    )]
    pub marca: Option<String>,

    #[validate(required, custom(function = "validate_tipo"))]
    pub tipo: Option<String>,

    #[validate(
        required,
        length(max = MAX_EXTRAS, message = "must contain at most 20 items"),
        custom(function = "validate_text_items")
    )]
    pub extras: Option<Vec<Value>>,

    #[validate(range(min = 1, message = "must be positive"))]
    pub peso: Option<i32>,

    #[validate(required)]
    pub edicion_limitada: Option<bool>,
}

impl CreateMoto {
    /// Validate against the create group and build an unsaved [`Moto`].
    pub fn into_new_moto(self) -> Result<Moto, CoreError> {
        self.validate()?;

        let (
            Some(modelo),
            Some(cilindrada),
            Some(marca),
            Some(tipo),
            Some(extras),
            Some(edicion_limitada),
        ) = (
            self.modelo,
            self.cilindrada,
            self.marca,
            self.tipo,
            self.extras,
            self.edicion_limitada,
        )
        else {
            return Err(missing_after_validation());
        };

        Ok(Moto {
            id: None,
            modelo,
            cilindrada,
            marca,
            tipo: parse_tipo(&tipo)?,
            extras: into_text_items(extras)?,
            peso: self.peso,
            created_at: None,
            updated_at: None,
            edicion_limitada,
        })
    }
}

// ---------------------------------------------------------------------------
// Update (full)
// ---------------------------------------------------------------------------

/// PUT payload: the update group. Full replacement, so an omitted `peso`
/// clears the stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMoto {
    #[validate(
        required,
        length(max = MAX_MODELO_LEN, message = "must be at most 50 characters"),
        custom(function = "validate_not_blank")
    )]
    pub modelo: Option<String>,

    #[validate(required, range(min = 1, message = "must be positive"))]
    pub cilindrada: Option<i32>,

    #[validate(
        required,
        length(max = MAX_MARCA_LEN, message = "must be at most 40 characters"),
        custom(function = "validate_not_blank")
    )]
    pub marca: Option<String>,

    #[validate(required, custom(function = "validate_tipo"))]
    pub tipo: Option<String>,

    #[validate(
        required,
        length(max = MAX_EXTRAS, message = "must contain at most 20 items"),
        custom(function = "validate_text_items")
    )]
    pub extras: Option<Vec<Value>>,

    #[validate(range(min = 1, message = "must be positive"))]
    pub peso: Option<i32>,
}

impl UpdateMoto {
    /// Validate against the update group and overwrite the writable fields
    /// of `moto`. Identity, audit timestamps and `edicion_limitada` are left
    /// untouched. On error `moto` is unchanged.
    pub fn apply_to(self, moto: &mut Moto) -> Result<(), CoreError> {
        self.validate()?;

        let (Some(modelo), Some(cilindrada), Some(marca), Some(tipo), Some(extras)) = (
            self.modelo,
            self.cilindrada,
            self.marca,
            self.tipo,
            self.extras,
        ) else {
            return Err(missing_after_validation());
        };
        let tipo = parse_tipo(&tipo)?;
        let extras = into_text_items(extras)?;

        moto.modelo = modelo;
        moto.cilindrada = cilindrada;
        moto.marca = marca;
        moto.tipo = tipo;
        moto.extras = extras;
        moto.peso = self.peso;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Update (partial)
// ---------------------------------------------------------------------------

/// PATCH payload. Absent fields keep their stored value; `peso: null`
/// clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchMoto {
    pub modelo: Option<String>,
    pub cilindrada: Option<i32>,
    pub marca: Option<String>,
    pub tipo: Option<String>,
    pub extras: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub peso: Option<Option<i32>>,
}

impl PatchMoto {
    /// Overlay the provided fields onto `current`, producing the full
    /// update-group payload to validate.
    pub fn merge_onto(self, current: &Moto) -> UpdateMoto {
        UpdateMoto {
            modelo: Some(self.modelo.unwrap_or_else(|| current.modelo.clone())),
            cilindrada: Some(self.cilindrada.unwrap_or(current.cilindrada)),
            marca: Some(self.marca.unwrap_or_else(|| current.marca.clone())),
            tipo: Some(
                self.tipo
                    .unwrap_or_else(|| current.tipo.as_str().to_string()),
            ),
            extras: Some(self.extras.unwrap_or_else(|| {
                current.extras.iter().cloned().map(Value::String).collect()
            })),
            peso: self.peso.unwrap_or(current.peso),
        }
    }
}

/// Distinguish an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn parse_tipo(value: &str) -> Result<MotoTipo, CoreError> {
    value
        .parse()
        .map_err(|e: motos_core::moto::UnknownTipo| CoreError::Validation(e.to_string()))
}

fn missing_after_validation() -> CoreError {
    CoreError::Internal("validated payload is missing a required field".to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use motos_core::moto::{MAX_EXTRAS, MAX_MARCA_LEN, MAX_MODELO_LEN};
    use motos_core::validation::FieldViolation;
    use serde_json::json;

    use super::*;

    fn monster() -> CreateMoto {
        serde_json::from_value(json!({
            "modelo": "Monster",
            "cilindrada": 937,
            "marca": "Ducati",
            "tipo": "naked",
            "extras": ["ABS"],
            "peso": 166,
            "edicionLimitada": false
        }))
        .unwrap()
    }

    fn stored_monster() -> Moto {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        Moto {
            id: Some(1),
            modelo: "Monster".to_string(),
            cilindrada: 937,
            marca: "Ducati".to_string(),
            tipo: MotoTipo::Naked,
            extras: vec!["ABS".to_string()],
            peso: Some(166),
            created_at: Some(at),
            updated_at: Some(at),
            edicion_limitada: true,
        }
    }

    fn violations(err: CoreError) -> Vec<FieldViolation> {
        match err {
            CoreError::InvalidFields(v) => v,
            other => panic!("expected InvalidFields, got {other:?}"),
        }
    }

    fn fields(err: CoreError) -> Vec<String> {
        violations(err).into_iter().map(|v| v.field).collect()
    }

    // -- create --------------------------------------------------------------

    #[test]
    fn valid_create_builds_unsaved_moto() {
        let moto = monster().into_new_moto().unwrap();
        assert_eq!(moto.id, None);
        assert_eq!(moto.created_at, None);
        assert_eq!(moto.updated_at, None);
        assert_eq!(moto.tipo, MotoTipo::Naked);
        assert_eq!(moto.extras, vec!["ABS"]);
        assert_eq!(moto.peso, Some(166));
        assert!(!moto.edicion_limitada);
        assert!(moto.is_new());
    }

    #[test]
    fn create_ignores_client_supplied_id_and_timestamps() {
        let input: CreateMoto = serde_json::from_value(json!({
            "id": 99,
            "createdAt": "2000-01-01T00:00:00Z",
            "modelo": "Monster",
            "cilindrada": 937,
            "marca": "Ducati",
            "tipo": "naked",
            "extras": [],
            "edicionLimitada": true
        }))
        .unwrap();
        let moto = input.into_new_moto().unwrap();
        assert_eq!(moto.id, None);
        assert_eq!(moto.created_at, None);
    }

    #[test]
    fn create_without_edicion_limitada_fails() {
        let input = CreateMoto {
            edicion_limitada: None,
            ..monster()
        };
        let v = violations(input.into_new_moto().unwrap_err());
        assert_eq!(
            v,
            vec![FieldViolation {
                field: "edicionLimitada".to_string(),
                code: "required".to_string(),
                message: "is required".to_string(),
            }]
        );
    }

    #[test]
    fn create_with_too_many_extras_fails() {
        let input = CreateMoto {
            extras: Some((0..=MAX_EXTRAS).map(|i| json!(format!("extra {i}"))).collect()),
            ..monster()
        };
        assert_eq!(fields(input.into_new_moto().unwrap_err()), vec!["extras"]);
    }

    #[test]
    fn create_with_max_extras_passes() {
        let input = CreateMoto {
            extras: Some((0..MAX_EXTRAS).map(|i| json!(format!("extra {i}"))).collect()),
            ..monster()
        };
        assert!(input.into_new_moto().is_ok());
    }

    #[test]
    fn create_with_blank_extra_fails() {
        let input = CreateMoto {
            extras: Some(vec![json!("ABS"), json!("")]),
            ..monster()
        };
        let v = violations(input.into_new_moto().unwrap_err());
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].code, "blank_item");
    }

    #[test]
    fn create_with_non_string_extra_reports_field() {
        let input: CreateMoto = serde_json::from_value(json!({
            "modelo": "Monster",
            "cilindrada": 937,
            "marca": "Ducati",
            "tipo": "naked",
            "extras": ["ABS", 1],
            "edicionLimitada": false
        }))
        .unwrap();
        let v = violations(input.into_new_moto().unwrap_err());
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].field, "extras");
        assert_eq!(v[0].code, "item_type");
    }

    #[test]
    fn create_with_non_positive_cilindrada_fails() {
        for cilindrada in [0, -125] {
            let input = CreateMoto {
                cilindrada: Some(cilindrada),
                ..monster()
            };
            let v = violations(input.into_new_moto().unwrap_err());
            assert_eq!(v[0].field, "cilindrada");
            assert_eq!(v[0].code, "range");
            assert_eq!(v[0].message, "must be positive");
        }
    }

    #[test]
    fn create_with_negative_peso_fails() {
        let input = CreateMoto {
            peso: Some(-5),
            ..monster()
        };
        assert_eq!(fields(input.into_new_moto().unwrap_err()), vec!["peso"]);
    }

    #[test]
    fn create_without_peso_passes() {
        let input = CreateMoto {
            peso: None,
            ..monster()
        };
        assert_eq!(input.into_new_moto().unwrap().peso, None);
    }

    #[test]
    fn create_length_limits_are_inclusive() {
        let ok = CreateMoto {
            modelo: Some("m".repeat(MAX_MODELO_LEN as usize)),
            marca: Some("m".repeat(MAX_MARCA_LEN as usize)),
            ..monster()
        };
        assert!(ok.into_new_moto().is_ok());

        let too_long = CreateMoto {
            modelo: Some("m".repeat(MAX_MODELO_LEN as usize + 1)),
            marca: Some("m".repeat(MAX_MARCA_LEN as usize + 1)),
            ..monster()
        };
        assert_eq!(
            fields(too_long.into_new_moto().unwrap_err()),
            vec!["marca", "modelo"]
        );
    }

    #[test]
    fn create_with_unknown_tipo_fails() {
        let input = CreateMoto {
            tipo: Some("trail".to_string()),
            ..monster()
        };
        let v = violations(input.into_new_moto().unwrap_err());
        assert_eq!(v[0].field, "tipo");
        assert_eq!(v[0].code, "tipo");
    }

    #[test]
    fn create_reports_every_failing_field() {
        let input = CreateMoto {
            modelo: Some("   ".to_string()),
            cilindrada: Some(0),
            marca: None,
            tipo: Some(String::new()),
            extras: None,
            peso: Some(-1),
            edicion_limitada: None,
        };
        assert_eq!(
            fields(input.into_new_moto().unwrap_err()),
            vec![
                "cilindrada",
                "edicionLimitada",
                "extras",
                "marca",
                "modelo",
                "peso",
                "tipo"
            ]
        );
    }

    #[test]
    fn empty_create_payload_reports_required_fields() {
        let v = violations(CreateMoto::default().into_new_moto().unwrap_err());
        assert_eq!(v.len(), 6);
        assert!(v.iter().all(|x| x.code == "required"));
    }

    // -- update --------------------------------------------------------------

    #[test]
    fn update_overwrites_writable_fields_only() {
        let mut moto = stored_monster();
        let original = moto.clone();
        let input: UpdateMoto = serde_json::from_value(json!({
            "modelo": "Monster 937",
            "cilindrada": 937,
            "marca": "Ducati",
            "tipo": "naked",
            "extras": ["ABS", "Quickshifter"],
            "peso": 166,
            "edicionLimitada": false
        }))
        .unwrap();

        input.apply_to(&mut moto).unwrap();

        assert_eq!(moto.modelo, "Monster 937");
        assert_eq!(moto.extras.len(), 2);
        assert_eq!(moto.id, original.id);
        assert_eq!(moto.created_at, original.created_at);
        assert_eq!(moto.updated_at, original.updated_at);
        assert!(moto.edicion_limitada, "edicionLimitada must be unchanged");
    }

    #[test]
    fn update_without_peso_clears_it() {
        let mut moto = stored_monster();
        let input = UpdateMoto {
            modelo: Some("Monster".to_string()),
            cilindrada: Some(937),
            marca: Some("Ducati".to_string()),
            tipo: Some("naked".to_string()),
            extras: Some(vec![]),
            peso: None,
        };
        input.apply_to(&mut moto).unwrap();
        assert_eq!(moto.peso, None);
    }

    #[test]
    fn invalid_update_leaves_record_untouched() {
        let mut moto = stored_monster();
        let before = moto.clone();
        let input = UpdateMoto {
            modelo: Some("Changed".to_string()),
            cilindrada: Some(-1),
            ..UpdateMoto::default()
        };
        let err = input.apply_to(&mut moto).unwrap_err();
        assert_matches!(err, CoreError::InvalidFields(_));
        assert_eq!(moto, before);
    }

    // -- patch ---------------------------------------------------------------

    #[test]
    fn patch_keeps_absent_fields() {
        let current = stored_monster();
        let patch: PatchMoto = serde_json::from_value(json!({"modelo": "Monster+"})).unwrap();
        let merged = patch.merge_onto(&current);

        assert_eq!(merged.modelo.as_deref(), Some("Monster+"));
        assert_eq!(merged.marca.as_deref(), Some("Ducati"));
        assert_eq!(merged.tipo.as_deref(), Some("naked"));
        assert_eq!(merged.peso, Some(166));
    }

    #[test]
    fn patch_without_extras_keeps_stored_list() {
        let mut moto = stored_monster();
        let patch: PatchMoto = serde_json::from_value(json!({"peso": 170})).unwrap();
        patch.merge_onto(&moto).apply_to(&mut moto).unwrap();
        assert_eq!(moto.extras, vec!["ABS"]);
        assert_eq!(moto.peso, Some(170));
    }

    #[test]
    fn patch_null_peso_clears_it() {
        let current = stored_monster();
        let patch: PatchMoto = serde_json::from_value(json!({"peso": null})).unwrap();
        assert_eq!(patch.peso, Some(None));
        assert_eq!(patch.merge_onto(&current).peso, None);
    }

    #[test]
    fn patch_is_validated_after_merge() {
        let mut moto = stored_monster();
        let patch: PatchMoto = serde_json::from_value(json!({"marca": " "})).unwrap();
        let err = patch.merge_onto(&moto).apply_to(&mut moto).unwrap_err();
        assert_eq!(fields(err), vec!["marca"]);
    }

    #[test]
    fn patch_drops_edicion_limitada() {
        let mut moto = stored_monster();
        let patch: PatchMoto =
            serde_json::from_value(json!({"edicionLimitada": false, "cilindrada": 950})).unwrap();
        patch.merge_onto(&moto).apply_to(&mut moto).unwrap();
        assert_eq!(moto.cilindrada, 950);
        assert!(moto.edicion_limitada);
    }

    // -- serialization -------------------------------------------------------

    #[test]
    fn moto_serializes_camel_case() {
        let value = serde_json::to_value(stored_monster()).unwrap();
        assert_eq!(value["edicionLimitada"], true);
        assert_eq!(value["tipo"], "naked");
        assert!(value["createdAt"].is_string());
        assert!(value["updatedAt"].is_string());
        assert!(value.get("created_at").is_none());
    }
}
