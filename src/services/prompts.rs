//! Prompt text sent to the LLM.
//!
//! Lesson, quiz and lesson-plan prompts are Macedonian and share the
//! [`SYSTEM_PERSONA`]. The drawing-program prompt is English and describes
//! the GeoScript subset the visualizer can run.

/// Persona for every teaching-content request.
pub const SYSTEM_PERSONA: &str = "\
Ти си \"Гео-Ментор 7\", специјализиран асистент за геометрија за VII одделение во Македонија.
Твојата цел е да им помогнеш на учениците да ги разберат концептите од геометријата (Кружница, Агол, 2Д форми, Трансформации).
Придржувај се до следните принципи:
1. Користи едноставен јазик соодветен за 12-13 годишни деца.
2. Давај многу визуелни описи.
3. Кога темата вклучува \"Геогебра\", објасни ги алатките (пр. \"Избери алатка 'Точка'\").
4. Биди охрабрувачки.";

/// Formatting rules appended to every JSON-returning prompt. Backslashes
/// break the JSON the model returns, so math goes out as Unicode.
pub const MATH_INSTRUCTION: &str = "\
ВАЖНО ЗА ФОРМАТИРАЊЕ И JSON (СТРОГИ ПРАВИЛА):
1. Враќај ЧИТЛИВ ТЕКСТ.
2. ЗАБРАНЕТО Е КОРИСТЕЊЕ НА LATEX СИНТАКСА ($...$, frac, pi, circ) во JSON вредностите.
3. ЗАБРАНЕТО Е КОРИСТЕЊЕ НА КОСИ ЦРТИ (BACKSLASHES) бидејќи тие го рушат JSON форматот.
4. Наместо LaTeX, користи UNICODE симболи и обичен текст:
   - π наместо pi
   - ° за степени
   - ² и ³ за степенување
   - √ за корен
   - Δ за триаголник
   - α, β, γ за агли.
   - P = 2·r·π (обичен запис).
5. За болдирање користи **текст**.";

/// Persona for drawing-program requests.
pub const GEOMETRY_ENGINE_PERSONA: &str = "You are an expert Geometry Engine. You translate English, \
Macedonian, Python/Manim and Asymptote descriptions into canvas drawing code. You prioritize \
mathematical accuracy, interactivity and style customization.";

#[must_use]
pub fn lesson_prompt(topic: &str, grade: &str) -> String {
    format!(
        "Креирај лекција за {grade} одделение на тема: \"{topic}\".
Лекцијата треба да биде интерактивна и разбирлива.

Структура:
1. Наслов.
2. Што ќе научиме (3 цели).
3. Главен дел (Дефиниции, Својства, Примери).
4. Задача за вежбање.

{MATH_INSTRUCTION}

Врати JSON:
{{
  \"title\": \"String\",
  \"objectives\": [\"String\", \"String\", \"String\"],
  \"content\": \"String (Markdown + Unicode Math)\"
}}"
    )
}

#[must_use]
pub fn scenario_prompt(topic: &str) -> String {
    format!(
        "Креирај детално Сценарио за час по математика за VII одделение на тема: \"{topic}\".
Пополни ги полињата за да одговараат на официјалниот формат за подготовки.

{MATH_INSTRUCTION}

Биди конкретен, методичен и јасен.
Врати JSON формат со следните полиња (сите се string):
- topic: Насловот на темата.
- standards: Стандарди за оценување (Користи булети).
- content: Содржина и нови поими кои се воведуваат.
- introActivity: Опис на воведната активност (околу 10 мин).
- mainActivity: Опис на главните активности, работа во групи, задачи (околу 20-25 мин). Користи Unicode за формули.
- finalActivity: Завршна активност, рефлексија и домашна работа (околу 10 мин).
- resources: Потребни средства и материјали.
- assessment: Начини на следење на напредокот.
- imagePrompt: Краток опис на цртеж кој го илустрира часот (на англиски)."
    )
}

#[must_use]
pub fn quiz_prompt(topic: &str, grade: &str, count: usize) -> String {
    format!(
        "Генерирај {count} прашања за геометрија, тема: \"{topic}\" ({grade} одделение).
Прашањата треба да бидат соодветни за возраста.
{MATH_INSTRUCTION}

Врати JSON низа. Секој елемент:
{{
  \"question\": \"String\",
  \"options\": [\"String\", \"String\", \"String\", \"String\"],
  \"correctAnswerIndex\": 0,
  \"explanation\": \"String\",
  \"difficulty\": \"Лесно\" | \"Средно\" | \"Тешко\"
}}"
    )
}

#[must_use]
pub fn program_prompt(description: &str) -> String {
    format!(
        "Task: Create an animated geometry drawing for an HTML5-style 2D canvas.

INPUT: \"{description}\"

SUPPORTED INPUT FORMATS:
1. Natural language (e.g. \"Draw a triangle\").
2. Python/Manim code.
3. ASYMPTOTE code: translate it into canvas commands.

The code runs as the body of a function, once per animation frame.
Available variables:
- ctx (2D drawing context: beginPath, moveTo, lineTo, arc, rect, closePath, stroke, fill,
  fillText, fillRect, strokeRect, clearRect, clip, save, restore, translate, rotate, scale,
  setLineDash; properties strokeStyle, fillStyle, lineWidth, font, textAlign)
- width, height (canvas dimensions)
- frame (animation counter)
- theme (current visual theme: 'dark', 'light' or 'board')
- showGrid (boolean)
- primaryColor (string, user selected color. USE THIS for main lines!)
- registerShape(id, {{type, x, y, r, w, h}}, infoText) (makes shapes clickable; type is 'point', 'circle' or 'rect')
- drawRotated(x, y, angle, drawFunction) (rotates an object around (x, y) without displacing it)
- Math, String, Number, parseFloat, isNaN

RULES:
1. COORDINATE LOGIC:
   - Center: cx = width / 2, cy = height / 2.
   - Scale: R = Math.min(width, height) * 0.45;
   - Use absolute coordinates like: x = cx + Math.cos(a) * R.
2. COLOR & STYLE:
   - ALWAYS use primaryColor for the main geometric object: ctx.strokeStyle = primaryColor;
   - Use ctx.lineWidth = 3; for main lines.
3. INTERACTIVITY (MANDATORY):
   - EVERY point, circle or polygon you draw MUST be registered for click detection.
   - Example point: registerShape('P1', {{ type: 'point', x: cx, y: cy, r: 10 }}, 'Center Point O');
   - Example circle: registerShape('C1', {{ type: 'circle', x: cx, y: cy, r: R }}, 'Circle k');
4. ROTATION LOGIC (CRITICAL):
   - DO NOT manually calculate cos/sin for rotation of the entire shape.
   - MUST USE drawRotated(cx, cy, frame * 0.02, () => {{ ... drawing commands ... }});
5. CONSTRUCTION RULES:
   - For bisectors and intersections, ensure radius > 0.5 * distance so arcs intersect clearly.
6. LANGUAGE SUBSET:
   - Plain ES6 expressions and statements only: const/let, functions, arrow functions, if/else,
     for, for...of, while, arrays, object literals, template strings.
   - NO TypeScript, classes, async code, DOM access, requestAnimationFrame, gradients or images.
7. ANIMATION LOOP:
   - The canvas is cleared automatically. Draw one frame.

IMPORTANT:
- Output ONLY the code inside the function.
- DO NOT wrap it in \"function draw() {{ ... }}\"."
    )
}

/// Example descriptions offered by the visualizer UI.
pub const EXAMPLE_DESCRIPTIONS: [&str; 5] = [
    "Ротација на рамностран триаголник околу неговиот центар",
    "Две паралелни прави пресечени со трансверзала, аглите трепкаат",
    "Кружница која се зголемува и намалува (пулсира)",
    "Тангента која се движи по кружница",
    "Симетрала на отсечка AB (со големи лаци R > AB/2)",
];
