//! Taxpayer registration lookup by CUIT
//!
//! Thin wrapper over an upstream government-adjacent provider. A canned
//! dataset backs development and demo environments via a config toggle.

pub mod cuit;
mod provider;

use serde::{Deserialize, Serialize};

pub use provider::{DummyTaxInfoProvider, HttpTaxInfoProvider, TaxInfoError, TaxInfoProvider};

/// Taxpayer record as the upstream provider serializes it. Field names
/// follow the upstream JSON contract, including its casing quirks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxInfo {
    pub actividad_principal: Option<String>,
    pub apellido: Option<String>,
    #[serde(rename = "CUIT")]
    pub cuit: Option<String>,
    #[serde(rename = "CatIVA")]
    pub cat_iva: Option<String>,
    pub cat_imp_ganancias: Option<String>,
    pub domicilio_codigo_postal: Option<String>,
    pub domicilio_dato_adicional: Option<String>,
    pub domicilio_direccion: Option<String>,
    pub domicilio_localidad: Option<String>,
    pub domicilio_pais: Option<String>,
    pub domicilio_provincia: Option<String>,
    pub domicilio_tipo: Option<String>,
    pub error: bool,
    #[serde(rename = "EstadoCUIT")]
    pub estado_cuit: Option<String>,
    pub message: Option<String>,
    pub monotributo: bool,
    pub monotributo_actividad: Option<String>,
    pub monotributo_categoria: Option<String>,
    pub nombre: Option<String>,
    pub padron_data: Option<String>,
    pub participaciones_accionarias: bool,
    pub persona_fisica: bool,
    pub razon_social: Option<String>,
    pub stat_code: i32,
}
