use crate::init::StartType;
use crate::state::RenderParams;
use crate::Result;

/// `<img>` source asking `endpoint` for the image of `params`.
pub fn image_url(endpoint: &str, params: &RenderParams) -> String {
    format!("{endpoint}?{}&image=yes", params.to_query())
}

/// Full HTML page showing the image at `image_src` and a form to change `params`.
pub fn render_page(params: &RenderParams, image_src: &str) -> Result<String> {
    let rule = params.rule()?;
    let description = escape_html(&rule.describe().to_string()).replace(" to ", "&nbsp;to&nbsp;");
    let initial = params.initial.as_ref().map_or("", |pattern| pattern.as_str());
    let start_options: String = StartType::ALL
        .iter()
        .map(|start| {
            let selected = if *start == params.start { " selected" } else { "" };
            format!("<option value=\"{start}\"{selected}>{start}</option>")
        })
        .collect();

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Rule {rule}</title></head>
<body>
<div style="width:450px">
<h1>Rule {rule}</h1>
<img
  src="{src}"
  width="{width}"
  height="{height}"
  alt="Image of rule {rule}"
>
<br>
{description}
<h2>Change the parameters</h2>
<form method="get">
Rule: <input type="text" value="{rule}" name="rule">
<br>
Number of cells: <input type="text" value="{cells}" name="cells">
<br>
Number of steps: <input type="text" value="{steps}" name="steps">
<br>
Random seed: <input type="text" value="{seed}" name="seed">
<br>
Start: <select name="start_type">{start_options}</select>
<br>
Initial cell values: <input type="text" value="{initial}" name="initial" size="35">
&nbsp;&nbsp;<input type="submit">
</form>
<hr>
<p>The top row of the image is the initial state; each following row is the next generation.</p>
<p>With the <code>random</code> start, cells come from the initial values when they are given and are random otherwise.
If fewer initial values than cells are given, the values are repeated from left to right until every cell has one.</p>
<p>A non-zero seed makes the random cells reproducible.</p>
<p>More information on cellular automata and their applications can be found in Stephen Wolfram's
<a href="http://www.wolframscience.com/nksonline/toc.html">A New Kind of Science</a>.</p>
</div>
</body>
</html>
"#,
        src = escape_html(image_src),
        width = params.cells,
        height = params.steps + 1,
        cells = params.cells,
        steps = params.steps,
        seed = params.seed,
    ))
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
