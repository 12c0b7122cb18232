//! Lecture d'un jeu de données Shapefile (.shp + .dbf + .prj)

use shapefile::dbase;
use tracing::{debug, info};

use crate::types::{Dataset, DatasetFiles, Feature};
use crate::{prj, ShpError};

/// Ouvre le jeu de données et charge toutes ses features
///
/// # Errors
///
/// `DatasetOpen` si le .shp ou le .dbf est illisible ou corrompu.
pub fn read(files: &DatasetFiles) -> Result<Dataset, ShpError> {
    let shp_label = files.shp.display().to_string();

    let fields = read_field_names(files)?;

    let mut reader = shapefile::Reader::from_path(&files.shp)
        .map_err(|e| ShpError::dataset_open(&shp_label, e))?;

    let mut features = Vec::new();
    for (index, item) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = item.map_err(|e| ShpError::dataset_open(&shp_label, e))?;
        features.push(Feature {
            index,
            shape,
            record,
        });
    }

    let crs = prj::read(files.prj.as_deref())?;

    info!(
        path = %shp_label,
        features = features.len(),
        fields = fields.len(),
        crs = %crs.as_ref().map(|c| c.label()).unwrap_or_else(|| "undefined".to_string()),
        "Dataset loaded"
    );

    Ok(Dataset {
        features,
        crs,
        fields,
        files: files.clone(),
    })
}

/// Lit le schéma de la table attributaire
fn read_field_names(files: &DatasetFiles) -> Result<Vec<String>, ShpError> {
    let reader = dbase::Reader::from_path(&files.dbf)
        .map_err(|e| ShpError::dataset_open(files.dbf.display().to_string(), e))?;

    let names: Vec<String> = reader
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .filter(|name| name != "DeletionFlag")
        .collect();

    debug!(fields = ?names, "Attribute schema");
    Ok(names)
}
