use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::cuit::CuitNumber;
use super::TaxInfo;

/// Single query surface for taxpayer lookups.
#[async_trait]
pub trait TaxInfoProvider: Send + Sync {
    async fn tax_info_by_cuit(&self, cuit: &CuitNumber) -> Result<TaxInfo, TaxInfoError>;
}

/// Provider backed by the real upstream HTTP service.
pub struct HttpTaxInfoProvider {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpTaxInfoProvider {
    pub fn new(base_url: String, username: String, password: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
        }
    }
}

#[async_trait]
impl TaxInfoProvider for HttpTaxInfoProvider {
    async fn tax_info_by_cuit(&self, cuit: &CuitNumber) -> Result<TaxInfo, TaxInfoError> {
        let url = format!("{}/{}", self.base_url, cuit.simplified());

        // The upstream expects credentials as plain headers, not basic auth.
        let response = self
            .client
            .get(url)
            .header("UserName", &self.username)
            .header("Password", &self.password)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaxInfoError::UnexpectedStatus { status });
        }

        Ok(response.json::<TaxInfo>().await?)
    }
}

/// Canned provider for environments without upstream credentials.
pub struct DummyTaxInfoProvider;

#[async_trait]
impl TaxInfoProvider for DummyTaxInfoProvider {
    async fn tax_info_by_cuit(&self, cuit: &CuitNumber) -> Result<TaxInfo, TaxInfoError> {
        Ok(TaxInfo {
            actividad_principal: Some(
                "620100-SERVICIOS DE CONSULTORES EN INFORMÁTICA Y SUMINISTROS DE PROGRAMAS DE INFORMÁTICA"
                    .to_string(),
            ),
            apellido: None,
            cuit: Some(cuit.original().to_string()),
            cat_iva: Some("RI".to_string()),
            cat_imp_ganancias: Some("RI".to_string()),
            domicilio_codigo_postal: Some("7600".to_string()),
            domicilio_dato_adicional: None,
            domicilio_direccion: Some("CALLE FALSA 123 Piso:2".to_string()),
            domicilio_localidad: Some("MAR DEL PLATA SUR".to_string()),
            domicilio_pais: Some("AR".to_string()),
            domicilio_provincia: Some("01".to_string()),
            domicilio_tipo: Some("FISCAL".to_string()),
            error: false,
            estado_cuit: Some("ACTIVO".to_string()),
            message: None,
            monotributo: false,
            monotributo_actividad: None,
            monotributo_categoria: None,
            nombre: None,
            padron_data: None,
            participaciones_accionarias: true,
            persona_fisica: false,
            razon_social: Some("RZS C.S. SA".to_string()),
            stat_code: 0,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaxInfoError {
    #[error("Failed to reach the tax info provider: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Tax info provider returned unexpected status {status}")]
    UnexpectedStatus { status: StatusCode },
}
