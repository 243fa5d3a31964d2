//! Integration tests for the claimfill assembly pipeline.
//!
//! These tests run the full path from claim data to PDF bytes against
//! synthetic templates built with lopdf. They verify:
//! - Trailing template pages are dropped
//! - Marks land on the right page, after the template's own content
//! - Signatures are placed as images, and blank ones are skipped
//! - Receipts are appended in order (PDF pages copied, images on new pages)
//! - Failures abort the run with the right error

use std::collections::BTreeMap;

use chrono::NaiveDate;
use image::ImageEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use claimfill::claim::{AnthemClaim, ExpenseItem, MrpClaim};
use claimfill::model::DateParts;
use claimfill::template::{anthem, mrp};
use claimfill::*;

// ─── Helpers ────────────────────────────────────────────────────

/// A letter-size PDF with one line of text per page.
fn make_pdf(page_count: usize, label: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids = Vec::new();
    for n in 0..page_count {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(40), Object::Integer(760)]),
                Operation::new("Tj", vec![Object::string_literal(format!("{} {}", label, n + 1))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// A PDF whose page tree has no pages at all.
fn make_empty_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => Object::Integer(0),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Three pages under a two-level page tree. Font and MediaBox live on the
/// root; the second and third pages sit under an intermediate node that
/// overrides MediaBox and sets Rotate. The pages carry none of these.
fn make_nested_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let root_id = doc.new_object_id();
    let branch_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let page = |doc: &mut Document, parent: ObjectId, n: usize| {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(40), Object::Integer(300)]),
                Operation::new("Tj", vec![Object::string_literal(format!("Nested {}", n))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => parent,
            "Contents" => content_id,
        })
    };
    let first = page(&mut doc, root_id, 1);
    let second = page(&mut doc, branch_id, 2);
    let third = page(&mut doc, branch_id, 3);

    let media_box = |w: i64, h: i64| {
        vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(w),
            Object::Integer(h),
        ]
    };
    doc.objects.insert(
        branch_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Parent" => root_id,
            "Kids" => vec![Object::Reference(second), Object::Reference(third)],
            "Count" => Object::Integer(2),
            "MediaBox" => media_box(300, 400),
            "Rotate" => Object::Integer(90),
        }),
    );
    doc.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(first), Object::Reference(branch_id)],
            "Count" => Object::Integer(3),
            "MediaBox" => media_box(500, 700),
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => root_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn make_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, _| {
        if x % 2 == 0 {
            image::Rgba([0, 0, 0, 255])
        } else {
            image::Rgba([255, 255, 255, 0])
        }
    });
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ColorType::Rgba8)
        .unwrap();
    buf
}

fn templates() -> MemorySource {
    MemorySource::new()
        .with(anthem::RESOURCE, make_pdf(2, "Anthem form page"))
        .with(mrp::RESOURCE, make_pdf(3, "MRP form page"))
}

fn claim_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

fn assert_valid_pdf(bytes: &[u8]) -> Document {
    assert!(bytes.starts_with(b"%PDF"), "output should start with the PDF header");
    Document::load_mem(bytes).expect("output should parse as a PDF")
}

fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

fn operations(doc: &Document, page_id: ObjectId) -> Vec<Operation> {
    let raw = doc.get_page_content(page_id).unwrap();
    Content::decode(&raw).unwrap().operations
}

fn shown_text(doc: &Document, page_id: ObjectId) -> Vec<String> {
    operations(doc, page_id)
        .into_iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

fn image_draws(doc: &Document, page_id: ObjectId) -> usize {
    operations(doc, page_id)
        .iter()
        .filter(|op| op.operator == "Do")
        .count()
}

fn assemble_anthem(
    claim: &AnthemClaim,
    signatures: &Signatures,
    attachments: &[Option<AttachmentFile>],
) -> Result<RenderedDocument, ClaimError> {
    Assembler::new(templates(), TemplateKind::Anthem.profile()).assemble_on(
        &claim.snapshot(),
        signatures,
        attachments,
        claim_date(),
    )
}

// ─── Anthem ─────────────────────────────────────────────────────

#[test]
fn test_anthem_fill_drops_instruction_page() {
    let rendered = assemble_anthem(&AnthemClaim::example(), &Signatures::new(), &[]).unwrap();
    let doc = assert_valid_pdf(&rendered.bytes);
    assert_eq!(doc.get_pages().len(), 1);
    assert_eq!(rendered.filename, "Anthem-Claim-Smith-2026-03-10.pdf");
}

#[test]
fn test_anthem_marks_follow_template_content() {
    let rendered = assemble_anthem(&AnthemClaim::example(), &Signatures::new(), &[]).unwrap();
    let doc = assert_valid_pdf(&rendered.bytes);
    let text = shown_text(&doc, page_ids(&doc)[0]);

    assert_eq!(text[0], "Anthem form page 1");
    assert!(text.contains(&"Smith".to_string()));
    assert!(text.contains(&"Springfield".to_string()));
    // female, spouse, work no, other insurance no, medicare yes, part B
    assert_eq!(text.iter().filter(|t| *t == "X").count(), 6);
    // The Medicare claim number has no box on this form.
    assert!(!text.contains(&"1EG4TE5MK73".to_string()));
}

#[test]
fn test_anthem_date_digits_drawn_one_per_slot() {
    let claim = AnthemClaim {
        patient_dob: DateParts::new("1", "15", "1990"),
        ..AnthemClaim::default()
    };
    let rendered = assemble_anthem(&claim, &Signatures::new(), &[]).unwrap();
    let doc = assert_valid_pdf(&rendered.bytes);
    let text = shown_text(&doc, page_ids(&doc)[0]);

    let digits: String = text
        .iter()
        .filter(|t| t.len() == 1 && t.chars().all(|c| c.is_ascii_digit()))
        .map(String::as_str)
        .collect();
    assert_eq!(digits, "01151990");
    assert_eq!(rendered.filename, "Anthem-Claim-Claim-2026-03-10.pdf");
}

#[test]
fn test_signatures_placed_and_blank_ones_skipped() {
    let mut signatures = Signatures::new();
    signatures.insert(
        "member_signature".to_string(),
        SignatureCapture::from_bytes(make_png(400, 100)),
    );
    signatures.insert("patient_signature".to_string(), SignatureCapture::empty());

    let rendered = assemble_anthem(&AnthemClaim::example(), &signatures, &[]).unwrap();
    let doc = assert_valid_pdf(&rendered.bytes);
    let page = page_ids(&doc)[0];
    assert_eq!(image_draws(&doc, page), 1);

    let ops = operations(&doc, page);
    let cm = ops.iter().find(|op| op.operator == "cm").unwrap();
    let values: Vec<f32> = cm.operands.iter().map(|o| o.as_float().unwrap()).collect();
    // 400x100 into 200x20 scales by 0.2, lower-left corner at the point.
    assert_eq!(values, vec![80.0, 0.0, 0.0, 20.0, 120.0, 44.0]);
}

#[test]
fn test_unreadable_signature_aborts() {
    let mut signatures = Signatures::new();
    signatures.insert(
        "member_signature".to_string(),
        SignatureCapture::from_bytes(b"not an image at all".to_vec()),
    );
    let err = assemble_anthem(&AnthemClaim::example(), &signatures, &[]).unwrap_err();
    assert!(matches!(err, ClaimError::Signature { ref field, .. } if field == "member_signature"));
}

#[test]
fn test_signature_from_data_url() {
    use base64::Engine;
    let url = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(make_png(10, 10))
    );
    let mut signatures = Signatures::new();
    signatures.insert(
        "patient_signature".to_string(),
        SignatureCapture::from_data_url(&url).unwrap(),
    );
    let rendered = assemble_anthem(&AnthemClaim::example(), &signatures, &[]).unwrap();
    let doc = assert_valid_pdf(&rendered.bytes);
    assert_eq!(image_draws(&doc, page_ids(&doc)[0]), 1);
}

// ─── Attachments ────────────────────────────────────────────────

#[test]
fn test_attachments_appended_in_order() {
    let attachments = vec![
        Some(AttachmentFile::new("scan.pdf", "application/pdf", make_pdf(2, "Receipt"))),
        None,
        Some(AttachmentFile::new("photo.png", "image/png", make_png(1224, 396))),
    ];
    let rendered = assemble_anthem(&AnthemClaim::example(), &Signatures::new(), &attachments).unwrap();
    let doc = assert_valid_pdf(&rendered.bytes);
    let pages = page_ids(&doc);
    assert_eq!(pages.len(), 4);

    assert_eq!(shown_text(&doc, pages[1]), vec!["Receipt 1"]);
    assert_eq!(shown_text(&doc, pages[2]), vec!["Receipt 2"]);
    assert_eq!(image_draws(&doc, pages[3]), 1);

    // 1224x396 is wider than the page: halved, then centred.
    let ops = operations(&doc, pages[3]);
    let cm = ops.iter().find(|op| op.operator == "cm").unwrap();
    let values: Vec<f32> = cm.operands.iter().map(|o| o.as_float().unwrap()).collect();
    assert_eq!(values, vec![612.0, 0.0, 0.0, 198.0, 0.0, 297.0]);
}

#[test]
fn test_copied_pages_keep_media_box() {
    let attachments = vec![Some(AttachmentFile::new(
        "scan.pdf",
        "application/pdf",
        make_pdf(1, "Receipt"),
    ))];
    let rendered = assemble_anthem(&AnthemClaim::default(), &Signatures::new(), &attachments).unwrap();
    let doc = assert_valid_pdf(&rendered.bytes);
    let copied = doc.get_dictionary(page_ids(&doc)[1]).unwrap();
    assert!(copied.has(b"MediaBox"));
}

#[test]
fn test_corrupt_pdf_attachment_aborts() {
    let attachments = vec![Some(AttachmentFile::new(
        "broken.pdf",
        "application/pdf",
        b"%PDF-1.4 garbage".to_vec(),
    ))];
    let err = assemble_anthem(&AnthemClaim::default(), &Signatures::new(), &attachments).unwrap_err();
    assert!(matches!(err, ClaimError::MalformedAttachment { .. }));
}

#[test]
fn test_empty_pdf_attachment_aborts() {
    let attachments = vec![Some(AttachmentFile::new("blank.pdf", "application/pdf", make_empty_pdf()))];
    let err = assemble_anthem(&AnthemClaim::default(), &Signatures::new(), &attachments).unwrap_err();
    match err {
        ClaimError::MalformedAttachment { name, reason } => {
            assert_eq!(name, "blank.pdf");
            assert!(reason.contains("no pages"), "{}", reason);
        }
        other => panic!("expected MalformedAttachment, got {}", other),
    }
}

#[test]
fn test_nested_page_tree_attributes_copied_down() {
    let attachments = vec![Some(AttachmentFile::new("nested.pdf", "application/pdf", make_nested_pdf()))];
    let rendered = assemble_anthem(&AnthemClaim::default(), &Signatures::new(), &attachments).unwrap();
    let doc = assert_valid_pdf(&rendered.bytes);
    let pages = page_ids(&doc);
    assert_eq!(pages.len(), 4);

    let media_box = |page: ObjectId| -> Vec<i64> {
        let dict = doc.get_dictionary(page).unwrap();
        dict.get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_i64().unwrap())
            .collect()
    };
    let rotate = |page: ObjectId| doc.get_dictionary(page).unwrap().get(b"Rotate").ok().and_then(|o| o.as_i64().ok());

    for (i, page) in pages[1..].iter().enumerate() {
        assert_eq!(shown_text(&doc, *page), vec![format!("Nested {}", i + 1)]);
        let dict = doc.get_dictionary(*page).unwrap();
        assert!(dict.has(b"Resources"), "page {} lost its fonts", i + 1);
    }
    assert_eq!(media_box(pages[1]), vec![0, 0, 500, 700]);
    assert_eq!(rotate(pages[1]), None);
    assert_eq!(media_box(pages[2]), vec![0, 0, 300, 400]);
    assert_eq!(rotate(pages[2]), Some(90));
    assert_eq!(media_box(pages[3]), vec![0, 0, 300, 400]);
    assert_eq!(rotate(pages[3]), Some(90));
}

#[test]
fn test_queue_slots_feed_assembler() {
    let mb = 1024 * 1024;
    let mut queue = AttachmentQueue::default();
    queue
        .add(AttachmentFile::new("big.pdf", "application/pdf", vec![0; 20 * mb]))
        .unwrap();
    assert!(queue
        .add(AttachmentFile::new("more.pdf", "application/pdf", vec![0; 6 * mb]))
        .is_err());
    assert_eq!(queue.total_bytes(), 20 * mb as u64);

    queue.remove(0);
    queue
        .add(AttachmentFile::new("scan.pdf", "application/pdf", make_pdf(1, "Receipt")))
        .unwrap();

    let rendered = assemble_anthem(&AnthemClaim::default(), &Signatures::new(), queue.slots()).unwrap();
    let doc = assert_valid_pdf(&rendered.bytes);
    assert_eq!(doc.get_pages().len(), 2);
}

// ─── MRP ────────────────────────────────────────────────────────

#[test]
fn test_mrp_fill_two_pages_with_expenses() {
    let claim = MrpClaim {
        participant_last_name: "Doe".to_string(),
        expenses: vec![
            ExpenseItem::new("Valley Optometry", "02/03/2026", 185.0),
            ExpenseItem::default(),
            ExpenseItem::new("Burbank Dental Group", "02/17/2026", 92.5),
        ],
        dental_plan: true,
        ..MrpClaim::default()
    };
    let mut signatures = Signatures::new();
    signatures.insert(
        "signature_image".to_string(),
        SignatureCapture::from_bytes(make_png(360, 80)),
    );

    let rendered = Assembler::new(templates(), TemplateKind::Mrp.profile())
        .assemble_on(&claim.snapshot(), &signatures, &[], claim_date())
        .unwrap();
    assert_eq!(rendered.filename, "MRP-Claim-Doe-2026-03-10.pdf");

    let doc = assert_valid_pdf(&rendered.bytes);
    let pages = page_ids(&doc);
    assert_eq!(pages.len(), 2);

    let first = shown_text(&doc, pages[0]);
    assert!(first.contains(&"Doe".to_string()));
    assert!(!first.contains(&"$185.00".to_string()));

    let second = shown_text(&doc, pages[1]);
    for expected in ["Valley Optometry", "$185.00", "Burbank Dental Group", "$92.50", "$277.50", "X"] {
        assert!(second.contains(&expected.to_string()), "missing {}", expected);
    }
    assert_eq!(image_draws(&doc, pages[1]), 1);
    assert_eq!(image_draws(&doc, pages[0]), 0);
}

#[test]
fn test_fill_json_uses_builtin_profile() {
    let json = r#"{ "participantLastName": "Roe", "visionPlan": true }"#;
    let rendered = fill_json(templates(), TemplateKind::Mrp, json, &BTreeMap::new(), &[]).unwrap();
    let doc = assert_valid_pdf(&rendered.bytes);
    assert_eq!(doc.get_pages().len(), 2);
    assert!(rendered.filename.starts_with("MRP-Claim-Roe-"));
}

// ─── Template failures ──────────────────────────────────────────

#[test]
fn test_missing_template_is_template_load_error() {
    let err = Assembler::new(MemorySource::new(), TemplateKind::Anthem.profile())
        .assemble(&FormSnapshot::new(), &Signatures::new(), &[])
        .unwrap_err();
    match err {
        ClaimError::TemplateLoad { resource, .. } => assert_eq!(resource, anthem::RESOURCE),
        other => panic!("expected TemplateLoad, got {}", other),
    }
}

#[test]
fn test_short_template_is_template_load_error() {
    let source = MemorySource::new().with(mrp::RESOURCE, make_pdf(1, "Only page"));
    let err = Assembler::new(source, TemplateKind::Mrp.profile())
        .assemble(&FormSnapshot::new(), &Signatures::new(), &[])
        .unwrap_err();
    assert!(matches!(err, ClaimError::TemplateLoad { .. }));
}

#[test]
fn test_corrupt_template_is_template_load_error() {
    let source = MemorySource::new().with(anthem::RESOURCE, b"<html>404</html>".to_vec());
    let err = Assembler::new(source, TemplateKind::Anthem.profile())
        .assemble(&FormSnapshot::new(), &Signatures::new(), &[])
        .unwrap_err();
    assert!(matches!(err, ClaimError::TemplateLoad { .. }));
}

#[test]
fn test_custom_profile_from_json() {
    let mut profile = TemplateKind::Anthem.profile();
    profile.name = "anthem-2025".to_string();
    profile.filename_prefix = "Anthem2025".to_string();
    let profile = TemplateProfile::from_json(&profile.to_json()).unwrap();

    let mut snapshot = FormSnapshot::new();
    snapshot.set("member_last_name", "Smith");
    let rendered = Assembler::new(templates(), profile)
        .assemble_on(&snapshot, &Signatures::new(), &[], claim_date())
        .unwrap();
    assert_eq!(rendered.filename, "Anthem2025-Smith-2026-03-10.pdf");
}
