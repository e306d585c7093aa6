//! Shared reference data for scenario tests

use crate::reference::{ApiRecord, FunctionRecord, ModelRecord, ReferenceData, ReferenceIndex};

/// fnA (f1), modelB (collection), keyC (c1), plus the get_orders API (a1)
pub fn reference_data() -> ReferenceData {
    ReferenceData {
        apis: vec![
            ApiRecord {
                id: Some("c1".into()),
                name: "Key C".into(),
                key: Some("keyC".into()),
            },
            ApiRecord {
                id: Some("a1".into()),
                name: "Get Orders".into(),
                key: Some("get_orders".into()),
            },
        ],
        functions: vec![FunctionRecord {
            id: "f1".into(),
            api_id: Some("c1".into()),
            name: "fnA".into(),
            key: None,
        }],
        models: vec![
            ModelRecord {
                name: "Model B".into(),
                collection_name: Some("modelB".into()),
                ..Default::default()
            },
            ModelRecord {
                name: "Order".into(),
                collection_name: Some("orders".into()),
                model_type: Some("collection".into()),
                estimated_count: Some(120),
                ..Default::default()
            },
        ],
    }
}

pub fn index() -> ReferenceIndex {
    ReferenceIndex::build(reference_data())
}
