use serde_json::{Map, Value};

use super::Workbench;
use super::details::{NO_SELECTION_HTML, NodeDetails};
use super::drag::UNPIN_DELAY;
use super::scene::{LABEL_DX, LABEL_DY, NodeStyle, escape_xml};
use super::zoom::{
    MAX_SCALE, MIN_SCALE, NAVIGATE_DURATION, RESET_DURATION, STEP_DURATION, ZOOM_FACTOR,
};

/// JSON literal safe to embed inside a `<script>` element.
fn script_json(value: &Value) -> Option<String> {
    Some(serde_json::to_string(value).ok()?.replace("</", "<\\/"))
}

/// Standalone HTML page: the rendered SVG, a details panel and a script for
/// selection, relation navigation, pan/zoom, node dragging and shortcuts.
///
/// `restore_href` links a filtered page to its unfiltered counterpart.
pub fn render_page(
    workbench: &Workbench,
    title: &str,
    restore_href: Option<&str>,
) -> Option<String> {
    let svg = workbench.to_svg()?;

    let mut details = Map::new();
    for node in workbench.graph().nodes() {
        if let Ok(d) = NodeDetails::for_node(workbench.graph(), &node.id) {
            details.insert(node.id.clone(), Value::String(d.to_html()));
        }
    }
    let details_json = script_json(&Value::Object(details))?;
    let selected_json = script_json(&workbench.selected().map_or(Value::Null, Value::from))?;

    let banner = match workbench.filter().source() {
        Some(source) => format!(
            r#"<div id="filter-banner">Showing a {} subgraph{}{}</div>"#,
            source,
            workbench
                .filter()
                .description()
                .map(|d| format!(": {}", escape_xml(d)))
                .unwrap_or_default(),
            restore_href
                .map(|href| format!(
                    r#" <a class="restore" href="{}">Restore full graph</a>"#,
                    escape_xml(href)
                ))
                .unwrap_or_default()
        ),
        None => String::new(),
    };
    let initial_details = workbench.details_html();
    let details_class = if workbench.panels().details_collapsed {
        "collapsed"
    } else {
        ""
    };
    let viewport = workbench.viewport();
    let transform = workbench.transform();
    let stroke = |style: NodeStyle| format!("['{}', '{}px']", style.stroke(), style.stroke_width());

    Some(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f5f5f5; color: #333; height: 100vh;
            display: flex; flex-direction: column;
        }}
        header {{
            padding: 10px 20px; background: #fff; border-bottom: 1px solid #ddd;
            display: flex; gap: 16px; align-items: baseline;
        }}
        header h1 {{ font-size: 1.1em; }}
        header span {{ font-size: 0.85em; color: #666; }}
        #filter-banner {{
            padding: 6px 20px; background: #fff4e5; color: #b35c00;
            font-size: 0.85em; border-bottom: 1px solid #ffd8a8;
        }}
        #filter-banner a {{ margin-left: 12px; color: #007bff; }}
        main {{ flex: 1; display: flex; overflow: hidden; }}
        #graph {{ flex: 1; overflow: hidden; }}
        #graph svg {{ width: 100%; height: 100%; cursor: grab; user-select: none; }}
        .node {{ cursor: pointer; }}
        .reset-button {{ cursor: pointer; }}
        #nodeDetailsPanel {{
            width: 320px; background: #fff; border-left: 1px solid #ddd;
            padding: 16px; overflow-y: auto;
        }}
        #nodeDetailsPanel.collapsed {{ display: none; }}
        #nodeDetailsPanel h3 {{ margin-bottom: 10px; word-break: break-all; }}
        #nodeDetailsPanel h4 {{ margin: 14px 0 6px; font-size: 0.9em; color: #555; }}
        .property-item {{ margin-bottom: 6px; font-size: 0.85em; }}
        .property-label {{ font-weight: 600; margin-right: 6px; }}
        .property-value.uri {{ font-size: 11px; word-break: break-all; }}
        .relation-item {{
            padding: 6px 8px; border-radius: 4px; cursor: pointer; font-size: 0.85em;
            display: flex; justify-content: space-between;
        }}
        .relation-item:hover {{ background: #eef6ff; }}
        .relation-predicate {{ color: #007bff; }}
        .no-selection {{ color: #888; font-style: italic; }}
        .hidden {{ display: none; }}
    </style>
</head>
<body>
    <header>
        <h1>{title}</h1>
        <span>{layout} layout &middot; {nodes} nodes &middot; {edges} edges</span>
    </header>
    {banner}
    <main>
        <div id="graph">{svg}</div>
        <aside id="nodeDetailsPanel" class="{details_class}">
            <div id="nodeDetailsContent">{initial_details}</div>
        </aside>
    </main>
    <script>
        const details = {details_json};
        const empty = {empty_json};
        const MIN_SCALE = {min_scale}, MAX_SCALE = {max_scale}, ZOOM_FACTOR = {zoom_factor};
        const RESET_MS = {reset_ms}, STEP_MS = {step_ms}, NAVIGATE_MS = {navigate_ms};
        const UNPIN_MS = {unpin_ms};
        const WIDTH = {width}, HEIGHT = {height}, LABEL_DX = {label_dx}, LABEL_DY = {label_dy};
        const STROKE = {{ normal: {stroke_normal}, selected: {stroke_selected}, dragging: {stroke_dragging} }};

        const panel = document.getElementById('nodeDetailsContent');
        const svg = document.querySelector('#graph svg');
        const container = svg.querySelector('g.graph-container');
        const circles = Array.from(svg.querySelectorAll('circle.node'));
        const labels = Array.from(svg.querySelectorAll('text.node-label'));
        const links = Array.from(svg.querySelectorAll('line.link'));

        let transform = {{ k: {k}, x: {tx}, y: {ty} }};
        let animation = null;
        let selectedId = {selected_json};
        let pinnedId = null;
        let dragIndex = null;
        let pan = null;
        let moved = false;

        const clamp = k => Math.min(MAX_SCALE, Math.max(MIN_SCALE, k));
        const ease = p => p < 0.5 ? 4 * p * p * p : 1 - Math.pow(2 - 2 * p, 3) / 2;

        function applyTransform() {{
            container.setAttribute(
                'transform',
                `translate(${{transform.x}},${{transform.y}}) scale(${{transform.k}})`
            );
        }}

        function animateTo(target, ms) {{
            if (animation) cancelAnimationFrame(animation);
            const from = {{ ...transform }};
            const start = performance.now();
            const step = now => {{
                const e = ease(Math.min(1, (now - start) / ms));
                transform = {{
                    k: from.k + (target.k - from.k) * e,
                    x: from.x + (target.x - from.x) * e,
                    y: from.y + (target.y - from.y) * e,
                }};
                applyTransform();
                animation = e < 1 ? requestAnimationFrame(step) : null;
            }};
            animation = requestAnimationFrame(step);
        }}

        function scaledAbout(factor, ax, ay) {{
            const k = clamp(transform.k * factor);
            const wx = (ax - transform.x) / transform.k;
            const wy = (ay - transform.y) / transform.k;
            return {{ k, x: ax - wx * k, y: ay - wy * k }};
        }}

        function pointer(e) {{
            const p = svg.createSVGPoint();
            p.x = e.clientX;
            p.y = e.clientY;
            const local = p.matrixTransform(svg.getScreenCTM().inverse());
            return [local.x, local.y];
        }}

        function restyle() {{
            circles.forEach(c => {{
                const id = c.dataset.id;
                const [color, width] = id === pinnedId ? STROKE.dragging
                    : id === selectedId ? STROKE.selected : STROKE.normal;
                c.setAttribute('stroke', color);
                c.setAttribute('stroke-width', width);
            }});
        }}

        function select(id, centre) {{
            selectedId = id;
            restyle();
            panel.innerHTML = id && details[id] ? details[id] : empty;
            panel.querySelectorAll('.relation-item').forEach(item => {{
                item.addEventListener('click', () => select(item.dataset.targetId, true));
            }});
            const c = circles.find(c => c.dataset.id === id);
            if (centre && c) {{
                const cx = +c.getAttribute('cx');
                const cy = +c.getAttribute('cy');
                animateTo({{
                    k: transform.k,
                    x: WIDTH / 2 - cx * transform.k,
                    y: HEIGHT / 2 - cy * transform.k,
                }}, NAVIGATE_MS);
            }}
        }}

        function moveNode(index, x, y) {{
            circles[index].setAttribute('cx', x);
            circles[index].setAttribute('cy', y);
            labels[index].setAttribute('x', x + LABEL_DX);
            labels[index].setAttribute('y', y + LABEL_DY);
            links.forEach(l => {{
                if (+l.dataset.source === index) {{
                    l.setAttribute('x1', x);
                    l.setAttribute('y1', y);
                }}
                if (+l.dataset.target === index) {{
                    l.setAttribute('x2', x);
                    l.setAttribute('y2', y);
                }}
            }});
        }}

        svg.addEventListener('mousedown', e => {{
            const [sx, sy] = pointer(e);
            const c = e.target.closest('circle.node');
            moved = false;
            if (c) {{
                dragIndex = circles.indexOf(c);
                pinnedId = c.dataset.id;
                restyle();
            }} else if (!e.target.closest('.reset-button')) {{
                pan = {{ sx, sy, x: transform.x, y: transform.y }};
            }}
        }});
        window.addEventListener('mousemove', e => {{
            if (dragIndex === null && !pan) return;
            const [sx, sy] = pointer(e);
            moved = true;
            if (dragIndex !== null) {{
                moveNode(dragIndex, (sx - transform.x) / transform.k, (sy - transform.y) / transform.k);
            }} else {{
                transform = {{ k: transform.k, x: pan.x + sx - pan.sx, y: pan.y + sy - pan.sy }};
                applyTransform();
            }}
        }});
        window.addEventListener('mouseup', () => {{
            pan = null;
            if (dragIndex === null) return;
            dragIndex = null;
            const released = pinnedId;
            setTimeout(() => {{
                if (pinnedId === released && dragIndex === null) {{
                    pinnedId = null;
                    restyle();
                }}
            }}, UNPIN_MS);
        }});
        svg.addEventListener('wheel', e => {{
            e.preventDefault();
            const [ax, ay] = pointer(e);
            transform = scaledAbout(Math.pow(2, -e.deltaY * 0.002), ax, ay);
            applyTransform();
        }}, {{ passive: false }});

        circles.forEach(c => c.addEventListener('click', e => {{
            e.stopPropagation();
            if (!moved) select(c.dataset.id, false);
        }}));
        svg.addEventListener('click', () => {{
            if (!moved) select(null, false);
        }});
        svg.querySelector('.reset-button')?.addEventListener('click', e => {{
            e.stopPropagation();
            animateTo({{ k: 1, x: 0, y: 0 }}, RESET_MS);
        }});
        document.addEventListener('keydown', e => {{
            const t = e.target;
            if (t.tagName === 'INPUT' || t.tagName === 'TEXTAREA' || t.isContentEditable) return;
            const key = e.key.toLowerCase();
            if (key === 'r') animateTo({{ k: 1, x: 0, y: 0 }}, RESET_MS);
            if (key === '+' || key === '=') {{
                animateTo(scaledAbout(ZOOM_FACTOR, WIDTH / 2, HEIGHT / 2), STEP_MS);
            }}
            if (key === '-' || key === '_') {{
                animateTo(scaledAbout(1 / ZOOM_FACTOR, WIDTH / 2, HEIGHT / 2), STEP_MS);
            }}
            if (key === 'h') svg.querySelector('.legend')?.classList.toggle('hidden');
            if (key === '?' || key === '/') {{
                svg.querySelector('.instructions')?.classList.toggle('hidden');
            }}
            if (key === 'p') {{
                document.getElementById('nodeDetailsPanel').classList.toggle('collapsed');
            }}
        }});

        select(selectedId, false);
    </script>
</body>
</html>
"#,
        title = escape_xml(title),
        layout = workbench.layout().display_name(),
        nodes = workbench.graph().node_count(),
        edges = workbench.graph().edge_count(),
        empty_json = script_json(&Value::String(NO_SELECTION_HTML.to_string()))?,
        min_scale = MIN_SCALE,
        max_scale = MAX_SCALE,
        zoom_factor = ZOOM_FACTOR,
        reset_ms = RESET_DURATION.as_millis(),
        step_ms = STEP_DURATION.as_millis(),
        navigate_ms = NAVIGATE_DURATION.as_millis(),
        unpin_ms = UNPIN_DELAY.as_millis(),
        width = viewport.width,
        height = viewport.height,
        label_dx = LABEL_DX,
        label_dy = LABEL_DY,
        stroke_normal = stroke(NodeStyle::Normal),
        stroke_selected = stroke(NodeStyle::Selected),
        stroke_dragging = stroke(NodeStyle::Dragging),
        k = transform.k,
        tx = transform.x,
        ty = transform.y,
    ))
}
