use crate::model::GroupedCatalog;

const ACCENT: &str = "#10b981";

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_months(catalog: &GroupedCatalog) -> String {
    let mut out = String::new();
    for (index, month) in catalog.months.iter().enumerate() {
        out.push_str(&format!(
            r#"      <div style="margin-bottom: 30px; page-break-inside: avoid;">
        <h3 style="font-size: 18px; color: #111827; margin-bottom: 15px; background: #f9fafb; padding: 10px 15px; border-radius: 8px;">{}. {}</h3>
        <div style="display: grid; grid-template-columns: 1fr 1fr; gap: 15px;">
"#,
            index + 1,
            escape_html(&month.name)
        ));
        for training in month.trainings.iter() {
            out.push_str(&format!(
                r#"          <div style="padding: 12px; border: 1px solid #e5e7eb; border-radius: 8px; background: #ffffff;">
            <div style="font-weight: 600; font-size: 14px; color: #111827; margin-bottom: 4px;">{}</div>
            <div style="font-size: 12px; color: #6b7280; display: flex; align-items: center;">
              <span style="display: inline-block; width: 10px; height: 10px; background: {ACCENT}; border-radius: 50%; margin-right: 6px;"></span>
              Durasi: {}
            </div>
          </div>
"#,
                escape_html(&training.name),
                escape_html(training.duration_text())
            ));
        }
        out.push_str("        </div>\n      </div>\n");
    }
    out
}

/// Printable annual schedule for one catalog, styled for A4 portrait.
pub fn render_html(catalog: &GroupedCatalog) -> Vec<u8> {
    let title = escape_html(&catalog.title);
    let months = render_months(catalog);

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="id">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title}</title>
  <link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;600;700&amp;display=swap" rel="stylesheet"/>
  <style>
    @page {{ size: A4 portrait; margin: 10mm; }}
    body {{ margin: 0; padding: 0; }}
  </style>
</head>
<body>
  <div id="capture-area">
    <div style="font-family: 'Inter', sans-serif; padding: 40px; color: #111827; background: white;">
      <div style="text-align: center; margin-bottom: 40px; border-bottom: 3px solid {ACCENT}; padding-bottom: 20px;">
        <h1 style="font-size: 28px; margin: 0; color: {ACCENT};">EduTrain</h1>
        <h2 style="font-size: 22px; margin: 10px 0 0 0; color: #374151;">{title}</h2>
        <p style="color: #6b7280; font-size: 14px; margin-top: 5px;">Jadwal Pelatihan Tahunan - EduTrain Indonesia</p>
      </div>
{months}      <div style="margin-top: 50px; text-align: center; font-size: 12px; color: #9ca3af; border-top: 1px solid #e5e7eb; padding-top: 20px;">
        &copy; 2024 EduTrain Indonesia. Seluruh hak cipta dilindungi.
      </div>
    </div>
  </div>
</body>
</html>
"####
    );
    html.into_bytes()
}
