use log::warn;
use super::{Db, DbResult};
use crate::types::ConfigItem;

/// Get the single item named `name`.
///
/// `None` unless exactly one row matches.
pub fn get_config<D>(db: &D, name: &str) -> DbResult<Option<ConfigItem>>
where
    D: Db + ?Sized,
{
    let mut items = db.find_configs(name)?;
    match items.len() {
        1 => Ok(items.pop()),
        0 => Ok(None),
        n => {
            warn!("{n} rows found for config key {name:?}");
            Ok(None)
        }
    }
}
