#[path = "../src/testing.rs"]
mod common;

use std::fs;
use std::path::{Path, PathBuf};

use common::{docx, paragraph, table};
use repair_docs::document::Document;
use repair_docs::engine::{scan_template, EngineConfig, Mapping, TemplateError, Value};
use repair_docs::input::{MappingSource, RecordSet};
use repair_docs::replace_placeholders;

fn write(dir: &Path, name: &str, bytes: Vec<u8>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn texts(doc: &Document) -> Vec<String> {
    doc.paragraphs().map(|p| p.text()).collect()
}

#[test]
fn end_to_end_act_of_work() {
    let dir = tempfile::tempdir().unwrap();
    let body = [
        paragraph(&["Акт к договору № [договоры.", "номер]"]),
        paragraph(&["Выполнены работы: [list(услуги.название)]"]),
        paragraph(&["Итого: [sum(услуги.стоимость)] руб."]),
        table(&["Вагон", "[вагоны.номер]"]),
        paragraph(&["Подпись: [подписант]"]),
    ]
    .concat();
    let template = write(
        dir.path(),
        "act.docx",
        docx(&body, Some(&paragraph(&["Договор [договоры.номер]"])), None),
    );

    let tokens = scan_template(&template).unwrap();
    assert_eq!(
        tokens,
        vec![
            "list(услуги.название)",
            "sum(услуги.стоимость)",
            "вагоны.номер",
            "договоры.номер",
            "подписант",
        ]
    );

    let records = RecordSet::from_json_str(
        r#"{
            "договоры": [{"номер": "2024.000001"}],
            "вагоны": [{"номер": "53012345"}],
            "услуги": [
                {"название": "Покраска", "стоимость": "1500"},
                {"название": "Сварка", "стоимость": "2000,50"}
            ]
        }"#,
    )
    .unwrap();
    let mapping = records.build(&tokens).unwrap();

    let output = dir.path().join("filled.docx");
    let report = replace_placeholders(&template, &output, &mapping, &EngineConfig::default()).unwrap();

    assert_eq!(report.unresolved, vec!["подписант"]);
    assert_eq!(report.lists_expanded, 1);

    let filled = Document::open(&output).unwrap();
    assert_eq!(
        texts(&filled),
        vec![
            "Акт к договору № 2024.000001",
            "Выполнены работы: ",
            "• Покраска",
            "• Сварка",
            "Итого: 3500.50 руб.",
            "Подпись: [подписант]",
        ]
    );

    let cells: Vec<String> = filled
        .tables()
        .flat_map(|t| t.rows())
        .flat_map(|r| r.cells())
        .flat_map(|c| c.paragraphs())
        .map(|p| p.text())
        .collect();
    assert_eq!(cells, vec!["Вагон", "53012345"]);

    let header = filled.header(0).unwrap();
    assert_eq!(header.paragraphs().next().unwrap().text(), "Договор 2024.000001");

    assert_eq!(scan_template(&output).unwrap(), vec!["подписант"]);
}

#[test]
fn list_items_are_indented() {
    let dir = tempfile::tempdir().unwrap();
    let template = write(dir.path(), "t.docx", docx(&paragraph(&["[работы]"]), None, None));
    let output = dir.path().join("out.docx");
    let mapping: Mapping = [("работы", Value::list(["Осмотр", "Ремонт"]))].into_iter().collect();

    replace_placeholders(&template, &output, &mapping, &EngineConfig::default()).unwrap();

    let filled = Document::open(&output).unwrap();
    let paragraphs: Vec<_> = filled.paragraphs().collect();
    assert_eq!(paragraphs.len(), 2);
    for p in paragraphs {
        assert!(p.text().starts_with("• "));
        assert_eq!(p.left_indent(), Some(EngineConfig::default().list.indent));
    }
}

#[test]
fn encoded_list_values_expand() {
    let dir = tempfile::tempdir().unwrap();
    let template = write(dir.path(), "t.docx", docx(&paragraph(&["[a]"]), None, None));
    let output = dir.path().join("out.docx");
    let config = EngineConfig::default();
    let mapping = Mapping::from_encoded([("a", "LIST:x|y|z")], &config.list);

    replace_placeholders(&template, &output, &mapping, &config).unwrap();

    assert_eq!(texts(&Document::open(&output).unwrap()), vec!["• x", "• y", "• z"]);
}

#[test]
fn empty_mapping_keeps_document_text() {
    let dir = tempfile::tempdir().unwrap();
    let body = [paragraph(&["[a] и [b]"]), table(&["[c]"])].concat();
    let template = write(dir.path(), "t.docx", docx(&body, None, Some(&paragraph(&["[d]"]))));
    let output = dir.path().join("out.docx");

    let report = replace_placeholders(&template, &output, &Mapping::new(), &EngineConfig::default()).unwrap();

    assert_eq!(report.unresolved, vec!["a", "b", "c", "d"]);
    assert_eq!(report.paragraphs_rewritten, 0);
    assert_eq!(scan_template(&output).unwrap(), scan_template(&template).unwrap());
}

#[test]
fn path_validation_errors() {
    let dir = tempfile::tempdir().unwrap();
    let template = write(dir.path(), "t.docx", docx(&paragraph(&["x"]), None, None));
    let config = EngineConfig::default();

    let same = replace_placeholders(&template, &template, &Mapping::new(), &config);
    assert!(matches!(same, Err(TemplateError::SamePath(_))));

    let missing = replace_placeholders(dir.path().join("nope.docx"), dir.path().join("o.docx"), &Mapping::new(), &config);
    assert!(missing.as_ref().err().unwrap().is_not_found());

    let unwritable = replace_placeholders(&template, dir.path().join("missing").join("o.docx"), &Mapping::new(), &config);
    assert!(unwritable.err().unwrap().is_permission());
}

#[test]
fn sample_template_fills_from_records() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("sample.docx");
    repair_docs::document::create_sample_template(&template).unwrap();

    let records = RecordSet::from_json_str(
        r#"{
            "договоры": [{"id": 1, "номер": "2024.000001", "дата": "23.12.2024"}],
            "вагоны": [{"номер": "12345", "подразделение": "ПМС-5"}],
            "услуги": [
                {"id": 10, "наименование": "Ремонт оси", "стоимость_с_ндс": 1200},
                {"id": 11, "наименование": "Покраска", "стоимость_с_ндс": 800},
                {"id": 12, "наименование": "Сварка", "стоимость_с_ндс": 9999}
            ],
            "договорные_услуги": [
                {"id_договора": 1, "id_услуги": 10},
                {"id_договора": 1, "id_услуги": 11}
            ]
        }"#,
    )
    .unwrap();
    let mapping = records.build(&scan_template(&template).unwrap()).unwrap();

    let output = dir.path().join("result.docx");
    let report = replace_placeholders(&template, &output, &mapping, &EngineConfig::default()).unwrap();

    assert!(report.is_complete());
    let filled = Document::open(&output).unwrap();
    let texts = texts(&filled);
    assert!(texts.contains(&"Список работ: ".to_string()));
    assert!(texts.contains(&"• Ремонт оси".to_string()));
    assert!(texts.contains(&"• Покраска".to_string()));
    assert!(!texts.iter().any(|t| t.contains("Сварка")));
    assert!(texts.contains(&"Сумма: 2000.00 руб.".to_string()));
    assert!(scan_template(&output).unwrap().is_empty());
}

#[test]
fn contract_without_services_gets_placeholder_text() {
    let dir = tempfile::tempdir().unwrap();
    let template = write(
        dir.path(),
        "t.docx",
        docx(&paragraph(&["Работы: [список_услуг(договоры.номер)]"]), None, None),
    );
    let mut records = RecordSet::new();
    records.push_row("договоры", [("номер", "2024.000002")]);
    let mapping = records.build(&scan_template(&template).unwrap()).unwrap();

    let output = dir.path().join("out.docx");
    replace_placeholders(&template, &output, &mapping, &EngineConfig::default()).unwrap();

    assert_eq!(
        texts(&Document::open(&output).unwrap()),
        vec![format!("Работы: {}", repair_docs::input::NO_SERVICES)]
    );
}
