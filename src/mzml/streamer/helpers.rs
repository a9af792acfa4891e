use quick_xml::events::BytesStart;

use super::MzMLError;
use crate::mzml::cv_params::CvParam;

/// Owned value of attribute `name`, if present
pub(super) fn get_attribute(e: &BytesStart, name: &str) -> Result<Option<String>, MzMLError> {
    let Some(attr) = e
        .try_get_attribute(name)
        .map_err(|err| MzMLError::XmlError(err.into()))?
    else {
        return Ok(None);
    };
    Ok(Some(std::str::from_utf8(&attr.value)?.to_owned()))
}

pub(super) fn parse_cv_param(e: &BytesStart) -> Result<CvParam, MzMLError> {
    Ok(CvParam {
        accession: get_attribute(e, "accession")?.unwrap_or_default(),
        name: get_attribute(e, "name")?.unwrap_or_default(),
        value: get_attribute(e, "value")?,
        unit_accession: get_attribute(e, "unitAccession")?,
    })
}
