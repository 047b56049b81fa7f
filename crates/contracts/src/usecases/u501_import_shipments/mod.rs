pub mod request;
pub mod response;

pub use request::{ImportRecordsRequest, ImportRow, ImportTextRequest};
pub use response::{ImportResponse, ImportSummary, ParsePreview, SkipReason, SkippedLine, TextLayout};

use crate::usecases::common::UseCaseMetadata;

pub struct ImportShipments;

impl UseCaseMetadata for ImportShipments {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "import_shipments"
    }

    fn display_name() -> &'static str {
        "Importação de Dados"
    }

    fn description() -> &'static str {
        "Загрузка перевозок за дату из вставленной таблицы с заменой данных этой даты"
    }
}
