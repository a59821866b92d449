//! Shared fixtures for integration tests.

#![allow(dead_code)]

/// Build a PDF whose pages draw the given content streams.
///
/// The font and resources live on the page tree root so pages inherit them.
pub fn build_pdf(contents: &[&str]) -> Vec<u8> {
    let page_count = contents.len();
    let mut objects: Vec<String> = Vec::new();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 4 + i * 2)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} /Resources << /Font << /F1 3 0 R >> >> /MediaBox [0 0 612 792] >>",
        kids.join(" "),
        page_count
    ));
    objects.push(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    );
    for (i, content) in contents.iter().enumerate() {
        objects.push(format!("<< /Type /Page /Parent 2 0 R /Contents {} 0 R >>", 5 + i * 2));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f\r\n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n\r\n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

/// Content stream drawing `text` in black at (72, y).
pub fn text_content(text: &str, y: u32) -> String {
    format!("BT /F1 12 Tf 0 g 72 {} Td ({}) Tj ET", y, text)
}

pub const RESUME: &str = "Jane Doe
jane.doe@example.com | (555) 123-4567

Summary
Backend engineer with a focus on reliable data systems.

Experience
Acme Corp, Senior Engineer, Jan 2019 - Present
- Built Python services backed by SQL databases
- Shipped Docker images to AWS on Linux hosts
- Reviewed code daily in Git

Education
B.Sc. Computer Science, 2014 - 2018

Skills
Python, SQL, Docker, AWS, Linux, Git";

pub const REFERENCE: &str =
    "Python, SQL, Docker, AWS, Linux, Git, Kubernetes, Terraform, Rust, GraphQL";
