//! In-memory presentation packages and fake providers for pipeline tests.

#![allow(dead_code)]

use slidekit_ai::{ChatMessage, ChatProvider, EmbeddingProvider, ImageTextExtractor};
use slidekit_core::Result;
use std::cell::{Cell, RefCell};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use zip::write::FileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

static NEXT_PART: AtomicUsize = AtomicUsize::new(1);

fn next_part() -> usize {
    NEXT_PART.fetch_add(1, Ordering::Relaxed)
}

/// One slide: shape XML plus the relationships and parts it references.
#[derive(Default)]
pub struct SlideSpec {
    shapes: Vec<String>,
    rels: Vec<(String, String, String)>,
    parts: Vec<(String, Vec<u8>)>,
    missing: bool,
}

impl SlideSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slide listed in the presentation whose part is absent from the package.
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    /// A title placeholder with an empty `p:spPr`; its position comes from
    /// the layout.
    pub fn placeholder_title(mut self, text: &str) -> Self {
        self.shapes.push(format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
            text
        ));
        self
    }

    /// A content placeholder with an empty `p:spPr`; the layout leaves its
    /// position to the master.
    pub fn placeholder_body(mut self, text: &str) -> Self {
        self.shapes.push(format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Content Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
            text
        ));
        self
    }

    pub fn title(mut self, text: &str) -> Self {
        self.shapes.push(format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="100" y="100"/><a:ext cx="5000" cy="800"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
            text
        ));
        self
    }

    /// A text box with one paragraph per entry, each a list of runs.
    pub fn text(mut self, paragraphs: &[&[&str]]) -> Self {
        let body: String = paragraphs
            .iter()
            .map(|runs| {
                let runs: String = runs
                    .iter()
                    .map(|r| format!("<a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r>", r))
                    .collect();
                format!("<a:p>{}</a:p>", runs)
            })
            .collect();
        self.shapes.push(format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="TextBox 2"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="200" y="1000"/><a:ext cx="4000" cy="2000"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>"#,
            body
        ));
        self
    }

    pub fn table(mut self, rows: &[&[&str]]) -> Self {
        let rows: String = rows
            .iter()
            .map(|cells| {
                let cells: String = cells
                    .iter()
                    .map(|c| {
                        format!(
                            "<a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></a:txBody></a:tc>",
                            c
                        )
                    })
                    .collect();
                format!("<a:tr h=\"370840\">{}</a:tr>", cells)
            })
            .collect();
        self.shapes.push(format!(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="4" name="Table 3"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="300" y="3000"/><a:ext cx="6000" cy="1500"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblGrid><a:gridCol w="3000"/><a:gridCol w="3000"/></a:tblGrid>{}</a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#,
            rows
        ));
        self
    }

    /// A picture whose image bytes live in `ppt/media/imageN.png`.
    pub fn picture(mut self, image: &[u8]) -> Self {
        let n = next_part();
        let rel_id = format!("rIdImg{}", n);
        let part = format!("ppt/media/image{}.png", n);
        self.rels.push((
            rel_id.clone(),
            format!("{}/image", REL_NS),
            format!("../media/image{}.png", n),
        ));
        self.parts.push((part, image.to_vec()));
        self.shapes.push(format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="5" name="Picture 4"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="400" y="400"/><a:ext cx="2000" cy="2000"/></a:xfrm></p:spPr></p:pic>"#,
            rel_id
        ));
        self
    }

    /// A clustered column chart with cached category and value data.
    pub fn chart(
        mut self,
        title: Option<&str>,
        categories: &[&str],
        series: &[(&str, &[f64])],
    ) -> Self {
        let n = next_part();
        let rel_id = format!("rIdChart{}", n);
        self.rels.push((
            rel_id.clone(),
            format!("{}/chart", REL_NS),
            format!("../charts/chart{}.xml", n),
        ));
        self.parts.push((
            format!("ppt/charts/chart{}.xml", n),
            chart_xml(title, categories, series).into_bytes(),
        ));
        self.push_chart_frame(&rel_id);
        self
    }

    /// A chart whose series hold only sheet references; the values live in
    /// the embedded workbook built from `rows`.
    pub fn workbook_chart(mut self, title: Option<&str>, rows: &[&[&str]]) -> Self {
        let series = rows.first().map(|r| r.len().saturating_sub(1)).unwrap_or(0);
        let xml = chart_xml_with_refs(title, series, rows.len().saturating_sub(1));
        self.push_embedded_chart(xml, workbook(rows));
        self
    }

    /// A chart with cached data whose embedded workbook holds `workbook`.
    pub fn cached_chart_with_workbook(
        mut self,
        categories: &[&str],
        series: &[(&str, &[f64])],
        workbook: Vec<u8>,
    ) -> Self {
        let xml = chart_xml(None, categories, series).replace(
            "</c:chart>",
            r#"</c:chart><c:externalData r:id="rId1"><c:autoUpdate val="0"/></c:externalData>"#,
        );
        self.push_embedded_chart(xml, workbook);
        self
    }

    fn push_embedded_chart(&mut self, xml: String, workbook: Vec<u8>) {
        let n = next_part();
        let rel_id = format!("rIdChart{}", n);
        self.rels.push((
            rel_id.clone(),
            format!("{}/chart", REL_NS),
            format!("../charts/chart{}.xml", n),
        ));
        self.parts.push((format!("ppt/charts/chart{}.xml", n), xml.into_bytes()));
        self.parts.push((
            format!("ppt/charts/_rels/chart{}.xml.rels", n),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/package" Target="../embeddings/Microsoft_Excel_Worksheet{}.xlsx"/></Relationships>"#,
                PKG_REL_NS, REL_NS, n
            )
            .into_bytes(),
        ));
        self.parts.push((
            format!("ppt/embeddings/Microsoft_Excel_Worksheet{}.xlsx", n),
            workbook,
        ));
        self.push_chart_frame(&rel_id);
    }

    fn push_chart_frame(&mut self, rel_id: &str) {
        self.shapes.push(format!(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="6" name="Chart 5"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="500" y="500"/><a:ext cx="3000" cy="3000"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" r:id="{}"/></a:graphicData></a:graphic></p:graphicFrame>"#,
            rel_id
        ));
    }
}

/// Chart part with `c:f` references only, pointing at a workbook with a
/// header row and `categories` data rows.
fn chart_xml_with_refs(title: Option<&str>, series: usize, categories: usize) -> String {
    let title = title
        .map(|t| {
            format!(
                "<c:title><c:tx><c:rich><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></c:rich></c:tx></c:title>",
                t
            )
        })
        .unwrap_or_default();
    let last = categories + 1;
    let sers: String = (0..series)
        .map(|i| {
            let col = char::from(b'B' + i as u8);
            format!(
                "<c:ser><c:idx val=\"{i}\"/><c:order val=\"{i}\"/>\
                 <c:tx><c:strRef><c:f>Sheet1!${col}$1</c:f></c:strRef></c:tx>\
                 <c:cat><c:strRef><c:f>Sheet1!$A$2:$A${last}</c:f></c:strRef></c:cat>\
                 <c:val><c:numRef><c:f>Sheet1!${col}$2:${col}${last}</c:f></c:numRef></c:val></c:ser>",
                i = i,
                col = col,
                last = last,
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><c:chart>{}<c:plotArea><c:barChart><c:barDir val="col"/><c:grouping val="clustered"/>{}</c:barChart></c:plotArea></c:chart><c:externalData r:id="rId1"><c:autoUpdate val="0"/></c:externalData></c:chartSpace>"#,
        title, sers
    )
}

/// A one-sheet xlsx workbook holding `rows`; numeric text becomes number
/// cells, empty strings are left out.
pub fn workbook(rows: &[&[&str]]) -> Vec<u8> {
    let sheet_rows: String = rows
        .iter()
        .enumerate()
        .map(|(r, cells)| {
            let cells: String = cells
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_empty())
                .map(|(c, v)| {
                    let cell = format!("{}{}", char::from(b'A' + c as u8), r + 1);
                    if v.parse::<f64>().is_ok() {
                        format!(r#"<c r="{}"><v>{}</v></c>"#, cell, v)
                    } else {
                        format!(r#"<c r="{}" t="str"><v>{}</v></c>"#, cell, v)
                    }
                })
                .collect();
            format!(r#"<row r="{}">{}</row>"#, r + 1, cells)
        })
        .collect();

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let parts = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
        ),
        (
            "_rels/.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
                PKG_REL_NS, REL_NS
            ),
        ),
        (
            "xl/workbook.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="{}"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
                REL_NS
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
                PKG_REL_NS, REL_NS
            ),
        ),
        (
            "xl/worksheets/sheet1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                sheet_rows
            ),
        ),
    ];
    for (name, content) in parts {
        zip.start_file(name, FileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn chart_xml(title: Option<&str>, categories: &[&str], series: &[(&str, &[f64])]) -> String {
    let title = title
        .map(|t| {
            format!(
                "<c:title><c:tx><c:rich><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></c:rich></c:tx></c:title>",
                t
            )
        })
        .unwrap_or_default();

    let points = |values: Vec<String>| -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("<c:pt idx=\"{}\"><c:v>{}</c:v></c:pt>", i, v))
            .collect()
    };

    let sers: String = series
        .iter()
        .enumerate()
        .map(|(i, (name, values))| {
            format!(
                "<c:ser><c:idx val=\"{i}\"/><c:order val=\"{i}\"/>\
                 <c:tx><c:strRef><c:f>Sheet1!$B$1</c:f><c:strCache><c:ptCount val=\"1\"/><c:pt idx=\"0\"><c:v>{name}</c:v></c:pt></c:strCache></c:strRef></c:tx>\
                 <c:cat><c:strRef><c:f>Sheet1!$A$2</c:f><c:strCache><c:ptCount val=\"{nc}\"/>{cats}</c:strCache></c:strRef></c:cat>\
                 <c:val><c:numRef><c:f>Sheet1!$B$2</c:f><c:numCache><c:ptCount val=\"{nv}\"/>{vals}</c:numCache></c:numRef></c:val></c:ser>",
                i = i,
                name = name,
                nc = categories.len(),
                cats = points(categories.iter().map(|c| c.to_string()).collect()),
                nv = values.len(),
                vals = points(values.iter().map(|v| v.to_string()).collect()),
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><c:chart>{}<c:plotArea><c:barChart><c:barDir val="col"/><c:grouping val="clustered"/>{}</c:barChart></c:plotArea></c:chart></c:chartSpace>"#,
        title, sers
    )
}

/// Builds a minimal but well-formed .pptx package.
#[derive(Default)]
pub struct DeckBuilder {
    title: String,
    author: String,
    slides: Vec<SlideSpec>,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.author = author.to_string();
        self
    }

    pub fn slide(mut self, slide: SlideSpec) -> Self {
        self.slides.push(slide);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        let put = |zip: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, data: &[u8]| {
            zip.start_file(name, options).unwrap();
            zip.write_all(data).unwrap();
        };

        put(
            &mut zip,
            "[Content_Types].xml",
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="png" ContentType="image/png"/></Types>"#,
        );
        put(
            &mut zip,
            "_rels/.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{pkg}"><Relationship Id="rId1" Type="{rel}/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#,
                pkg = PKG_REL_NS,
                rel = REL_NS
            )
            .as_bytes(),
        );
        put(
            &mut zip,
            "docProps/core.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>{}</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">2024-03-01T09:30:00Z</dcterms:created></cp:coreProperties>"#,
                self.title, self.author
            )
            .as_bytes(),
        );

        let ids: String = (1..=self.slides.len())
            .map(|n| format!(r#"<p:sldId id="{}" r:id="rIdSlide{}"/>"#, 255 + n, n))
            .collect();
        put(
            &mut zip,
            "ppt/presentation.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#,
                NS, ids
            )
            .as_bytes(),
        );

        let rels: String = (1..=self.slides.len())
            .map(|n| {
                format!(
                    r#"<Relationship Id="rIdSlide{n}" Type="{rel}/slide" Target="slides/slide{n}.xml"/>"#,
                    n = n,
                    rel = REL_NS
                )
            })
            .collect();
        put(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}">{}</Relationships>"#,
                PKG_REL_NS, rels
            )
            .as_bytes(),
        );

        write_layout_and_master(&mut zip, &put);

        for (i, slide) in self.slides.iter().enumerate() {
            if slide.missing {
                continue;
            }
            let n = i + 1;
            put(
                &mut zip,
                &format!("ppt/slides/slide{}.xml", n),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
                    NS,
                    slide.shapes.concat()
                )
                .as_bytes(),
            );

            let rels: String = slide
                .rels
                .iter()
                .map(|(id, ty, target)| {
                    format!(r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#, id, ty, target)
                })
                .collect();
            put(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", n),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}"><Relationship Id="rIdLayout" Type="{}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>{}</Relationships>"#,
                    PKG_REL_NS, REL_NS, rels
                )
                .as_bytes(),
            );

            for (name, data) in &slide.parts {
                put(&mut zip, name, data);
            }
        }

        zip.finish().unwrap().into_inner()
    }

    /// Write the package to a temporary `.pptx` file.
    pub fn write_temp(&self) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".pptx").tempfile().unwrap();
        file.write_all(&self.build()).unwrap();
        file.flush().unwrap();
        file
    }
}

/// Title placeholder box on the layout.
pub const LAYOUT_TITLE_BOX: [i64; 4] = [457200, 274638, 8229600, 1143000];
/// Body placeholder box on the master; the layout's body placeholder has none.
pub const MASTER_BODY_BOX: [i64; 4] = [457200, 1600200, 8229600, 4525963];

fn placeholder_xml(id: u32, name: &str, ph: &str, bbox: Option<[i64; 4]>) -> String {
    let sp_pr = match bbox {
        Some([x, y, cx, cy]) => format!(
            r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm></p:spPr>"#,
            x, y, cx, cy
        ),
        None => "<p:spPr/>".to_string(),
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr/><p:nvPr>{}</p:nvPr></p:nvSpPr>{}</p:sp>"#,
        id, name, ph, sp_pr
    )
}

/// One layout (title box of its own, body box from the master) and its master.
fn write_layout_and_master<F>(zip: &mut ZipWriter<Cursor<Vec<u8>>>, put: &F)
where
    F: Fn(&mut ZipWriter<Cursor<Vec<u8>>>, &str, &[u8]),
{
    let tree = |shapes: String| {
        format!(
            r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld>"#,
            shapes
        )
    };
    let rels = |rel: &str| {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}">{}</Relationships>"#,
            PKG_REL_NS, rel
        )
    };

    let layout = tree(
        placeholder_xml(2, "Title 1", r#"<p:ph type="title"/>"#, Some(LAYOUT_TITLE_BOX))
            + &placeholder_xml(3, "Content Placeholder 2", r#"<p:ph idx="1"/>"#, None),
    );
    put(
        zip,
        "ppt/slideLayouts/slideLayout1.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {} type="obj">{}</p:sldLayout>"#,
            NS, layout
        )
        .as_bytes(),
    );
    put(
        zip,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        rels(&format!(
            r#"<Relationship Id="rId1" Type="{}/slideMaster" Target="../slideMasters/slideMaster1.xml"/>"#,
            REL_NS
        ))
        .as_bytes(),
    );

    let master = tree(
        placeholder_xml(2, "Title Placeholder 1", r#"<p:ph type="title"/>"#, Some([1, 2, 3, 4]))
            + &placeholder_xml(
                3,
                "Text Placeholder 2",
                r#"<p:ph type="body" idx="1"/>"#,
                Some(MASTER_BODY_BOX),
            ),
    );
    put(
        zip,
        "ppt/slideMasters/slideMaster1.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {}>{}</p:sldMaster>"#,
            NS, master
        )
        .as_bytes(),
    );
    put(
        zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        rels(&format!(
            r#"<Relationship Id="rId1" Type="{}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
            REL_NS
        ))
        .as_bytes(),
    );
}

/// Embeds text as counts of a few marker words, so similarity follows
/// shared vocabulary.
pub struct KeywordEmbedder {
    pub vocabulary: Vec<&'static str>,
    pub calls: Cell<usize>,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&'static str]) -> Self {
        Self {
            vocabulary: vocabulary.to_vec(),
            calls: Cell::new(0),
        }
    }
}

impl EmbeddingProvider for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.set(self.calls.get() + 1);
        let lower = text.to_lowercase();
        Ok(self
            .vocabulary
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect())
    }
}

/// Returns a canned reply and records every request.
pub struct ScriptedChat {
    pub reply: String,
    pub requests: RefCell<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChat {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn last_user_message(&self) -> String {
        self.requests
            .borrow()
            .last()
            .and_then(|m| m.last())
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

impl ChatProvider for ScriptedChat {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.requests.borrow_mut().push(messages.to_vec());
        Ok(self.reply.clone())
    }
}

/// OCR stand-in that reports how many bytes it was given.
pub struct FakeOcr;

impl ImageTextExtractor for FakeOcr {
    fn extract_text(&self, image: &[u8]) -> Result<String> {
        Ok(format!("Scanned  text\u{00A0}of {} bytes", image.len()))
    }
}
