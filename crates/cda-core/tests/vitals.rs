//! End-to-end extraction of the vital signs section.

use std::thread;

use cda_core::sections::vitals;
use cda_core::{Document, SectionLayout, SectionMapping, extract};
use cda_model::{Precision, ResultRecord};

const VITALS_OID: &str = "2.16.840.1.113883.10.20.22.2.4.1";

const SCENARIO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ClinicalDocument xmlns="urn:hl7-org:v3" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <templateId root="2.16.840.1.113883.10.20.22.1.1"/>
  <component>
    <structuredBody>
      <component>
        <section>
          <templateId root="2.16.840.1.113883.10.20.22.2.4.1"/>
          <templateId root="2.16.840.1.113883.10.20.22.2.4"/>
          <code code="8716-3" codeSystem="2.16.840.1.113883.6.1"/>
          <title>Vital Signs</title>
          <entry>
            <effectiveTime value="20210101"/>
            <component>
              <code code="8310-5" displayName="Body Temperature"
                    codeSystem="2.16.840.1.113883.6.1" codeSystemName="LOINC"/>
              <value xsi:type="PQ" value="37" unit="Cel"/>
            </component>
          </entry>
          <entry/>
        </section>
      </component>
    </structuredBody>
  </component>
</ClinicalDocument>"#;

fn scenario() -> Document {
    Document::parse_str(SCENARIO).expect("parse scenario")
}

#[test]
fn scenario_two_entries() {
    let groups = vitals::process(&scenario()).expect("extract vitals");
    assert_eq!(groups.len(), 2);

    let first = &groups[0];
    let date = first.date.as_ref().expect("first entry date");
    assert_eq!(date.year(), 2021);
    assert_eq!(date.precision(), Precision::Day);
    assert_eq!(
        first.results,
        vec![ResultRecord {
            name: Some("Body Temperature".to_string()),
            code: Some("8310-5".to_string()),
            code_system: Some("2.16.840.1.113883.6.1".to_string()),
            code_system_name: Some("LOINC".to_string()),
            value: Some("37".to_string()),
            unit: Some("Cel".to_string()),
        }]
    );

    let second = &groups[1];
    assert!(second.date.is_none());
    assert!(second.results.is_empty());
}

#[test]
fn scenario_json_shape() {
    let groups = vitals::process(&scenario()).expect("extract vitals");
    let json = serde_json::to_string(&groups).expect("serialize groups");
    insta::assert_snapshot!(json, @r#"[{"date":{"year":2021,"month":1,"day":1,"precision":"day"},"results":[{"name":"Body Temperature","code":"8310-5","code_system":"2.16.840.1.113883.6.1","code_system_name":"LOINC","value":"37","unit":"Cel"}]},{"date":null,"results":[]}]"#);
}

#[test]
fn generic_template_id_finds_same_section() {
    let document = scenario();
    let by_specific = extract(&document, VITALS_OID, &SectionLayout::FLAT).expect("specific");
    let by_generic = extract(
        &document,
        "2.16.840.1.113883.10.20.22.2.4",
        &SectionLayout::FLAT,
    )
    .expect("generic");
    assert_eq!(by_specific, by_generic);
}

#[test]
fn document_without_vitals_is_empty() {
    let document = Document::parse_str(
        r#"<ClinicalDocument><component><section>
<templateId root="2.16.840.1.113883.10.20.22.2.5.1"/>
<entry><effectiveTime value="garbage"/></entry>
</section></component></ClinicalDocument>"#,
    )
    .expect("parse");
    assert!(vitals::process(&document).expect("extract").is_empty());
}

#[test]
fn component_count_and_order_preserved() {
    let mut body = String::new();
    for index in 0..5 {
        body.push_str(&format!(
            r#"<component><code code="c{index}"/><value value="{index}"/></component>"#
        ));
    }
    let xml = format!(
        r#"<section><templateId root="{VITALS_OID}"/><entry>{body}</entry></section>"#
    );
    let document = Document::parse_str(&xml).expect("parse");
    let groups = vitals::process(&document).expect("extract");
    let codes: Vec<_> = groups[0]
        .results
        .iter()
        .map(|r| r.code.clone().expect("code"))
        .collect();
    assert_eq!(codes, ["c0", "c1", "c2", "c3", "c4"]);
}

#[test]
fn attribute_values_are_verbatim() {
    let xml = format!(
        r#"<section><templateId root="{VITALS_OID}"/><entry><component>
<code code=" 8310-5 " displayName="body TEMPERATURE"/>
<value value="037.0" unit=""/>
</component></entry></section>"#
    );
    let document = Document::parse_str(&xml).expect("parse");
    let groups = vitals::process(&document).expect("extract");
    let result = &groups[0].results[0];
    assert_eq!(result.code.as_deref(), Some(" 8310-5 "));
    assert_eq!(result.name.as_deref(), Some("body TEMPERATURE"));
    assert_eq!(result.value.as_deref(), Some("037.0"));
    assert_eq!(result.unit.as_deref(), Some(""));
    assert_eq!(result.code_system, None);
    assert_eq!(result.code_system_name, None);
}

#[test]
fn prefixed_elements_are_matched() {
    let xml = format!(
        r#"<v3:section xmlns:v3="urn:hl7-org:v3"><v3:templateId root="{VITALS_OID}"/>
<v3:entry><v3:effectiveTime value="202103"/><v3:component><v3:code code="8480-6"/></v3:component></v3:entry>
</v3:section>"#
    );
    let document = Document::parse_str(&xml).expect("parse");
    let groups = vitals::process(&document).expect("extract");
    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].date.as_ref().map(|d| d.precision()),
        Some(Precision::Month)
    );
    assert_eq!(groups[0].results[0].code.as_deref(), Some("8480-6"));
}

#[test]
fn concurrent_extractors_share_document() {
    let owned = scenario();
    let document = &owned;
    let expected = vitals::process(document).expect("extract");
    thread::scope(|scope| {
        let handles: Vec<_> = SectionMapping::builtin()
            .iter()
            .map(|mapping| scope.spawn(move || mapping.extract(document)))
            .collect();
        for handle in handles {
            handle.join().expect("join").expect("extract");
        }
    });
    assert_eq!(vitals::process(document).expect("extract"), expected);
}
