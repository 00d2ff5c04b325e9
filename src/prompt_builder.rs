// src/prompt_builder.rs
//
// 两个任务族的提示词模板与批次拼装。
// 分隔符约定不会出现在合法的临床输入文本里，不做运行时校验。

/// 同义词任务的批内词条分隔符
pub const TERM_SEPARATOR: &str = "\n---TERM SEPARATOR---\n";

/// 词元解析任务的批内报告分隔符
pub const REPORT_SEPARATOR: &str = "\n---REPORT SEPARATOR---\n";

const SYNONYM_INSTRUCTIONS: &str = r#"RadLex is a comprehensive set of radiology terms for use in radiology reporting, decision support, data mining, data registries, education, and research. It is widely used in medical imaging, artificial intelligence, and clinical decision support systems to ensure consistent and precise descriptions of radiological findings.

However, the current synonym structure in RadLex is relatively **rigid and limited**, which restricts its applicability in diverse real-world clinical and AI-driven scenarios. Expanding and refining synonym mappings is essential to enhance its usability in **natural language processing (NLP), deep learning models, and automated clinical decision support systems**.

Generate synonyms and lexical variants for the following RadLex lexicon terms and categorize them into **four distinct groups**.
**Important: Each generated synonym or lexical variant must fully capture the complete meaning of the original term as a complete phrase. Do not extract or generate only a partial component of the term.**
**Before finalizing your response, double-check that every generated synonym or lexical variant fully encapsulates the complete clinical concept of the original term. If any of the outputs do not meet this requirement, please revise them accordingly.**
**Return only the JSON object without any extra text or commentary.**
The expressions must be clinically relevant, medically precise, and commonly used in medical literature or practice.

### **Definition: Synonyms & Lexical Variants**
For the purpose of this task, **"synonyms"** refer strictly to terms that are **semantically equivalent and can be used interchangeably in all clinical contexts.**
**"Lexical variants"** include morphological, orthographic, and abbreviation variations, which differ in form but not in meaning.

### **Categories of Synonyms & Lexical Variants:**
1. **Morphological Variants (Category 1):**
   - Terms that are **fully synonymous but differ in grammatical form** (e.g., noun vs. adjective, singular vs. plural, verb vs. participle).
   - **Examples:**
     - pleura vs. pleural
     - bronchiectasis vs. bronchiectatic
     - attenuation vs. attenuated vs. attenuating

2. **Orthographic Variants (Category 2):**
   - Terms that are **fully synonymous but differ only in spacing, hyphenation, or alternative spellings**.
   - **Examples:**
     - air trapping vs. air-trapping vs. airtrapping
     - airspace vs. air space vs. air-space

3. **Acronyms & Abbreviations (Category 3):**
   - Commonly used abbreviations or acronyms that are synonymous with the term.
   - **Examples:**
     - myocardial infarction → MI
     - acute respiratory distress syndrome → ARDS

4. **Strict Semantic Synonyms (Category 4):**
   - Terms that **convey the exact same meaning and can be used interchangeably in all clinical contexts**.
   - **Synonyms must be strictly equivalent and should not introduce ambiguity or potential contextual differences.**
   - **Examples:**
     - shortness of breath vs. dyspnea
     - neoplasm vs. tumorous condition
     - probably vs. likely

Format the output as JSON:
{
  "term_and_synonyms": [
    {
      "term": "<lexicon 1>",
      "category_1": ["Morphological Variant 1", "Morphological Variant 2", "Morphological Variant 3", ...],
      "category_2": ["Orthographic Variant 1", "Orthographic Variant 2", "Orthographic Variant 3", ...],
      "category_3": ["Acronym 1", "Acronym 2","Acronym 3", ...],
      "category_4": ["Strict Semantic Synonym 1", "Strict Semantic Synonym 2", "Strict Semantic Synonym 3", ...]
    }
    ...
  ]
}

terms:"#;

const UNIT_PARSING_INSTRUCTIONS: &str = r#"This word string is a CT reports that have undergone de-identification and preprocessing.

Your task:
1. Correct typos in the word strings to their most likely intended forms based on medical terminology.
   - Ensure that anatomical expressions use the correct parts of speech. For example, "mediastinum lymph node" should be corrected to "mediastinal lymph node."
   - If anatomical locations are connected by "and" or "or", explicitly expand them to ensure each location is fully described:
     - Example: "right internal mammary and left axillary lymph node" should be expanded to "right internal mammary lymph node and left axillary lymph node."
2. Divide the corrected word strings into **concise lexicon units** and assign each unit to one of the following categories:
   - **1. Anatomical entity with location**: Anatomical structures combined with their positional descriptions (e.g., "upper lobe of right lung", "superior pole of left kidney", "mediastinal lymph node").
       - **Do not split anatomical components** such as "lung, lobe, segment" or similar hierarchical descriptions into separate units. These must be combined into a single lexicon unit.
   - **2. Physiologic condition**: Functional or pathological states or processes occurring within the body. These are inherent conditions (e.g., "hyperinflation", "consolidation", "fibrosis", "granuloma", "cyst", "bronchiectasis", "atelectasis", "lymphadenopathy", "coronary artery calcification") or **symptoms** such as "cough", "pain", or "shortness of breath" when directly stated in the text. These are **not explicitly described as visual observations** on imaging.
   - **3. Imaging observation**: Findings or abnormalities described as direct **visual interpretations** from imaging (e.g., "ill-defined margin", "nodular opacity", "ground-glass pattern"). These are descriptive terms that indicate how a condition appears in imaging studies.
       - **Key distinction**:
         - If the term refers to a condition inherently existing in the body (e.g., "fibrosis", "consolidation", "lymphadenopathy"), it belongs to **Physiologic condition**.
         - If the term refers to how the condition is visually described on imaging (e.g., "ground-glass opacity", "nodular appearance"), it belongs to **Imaging observation**.
       - Example:
         - "Fibrosis" → **Physiologic condition**
         - "Reticular pattern of fibrosis" → **Imaging observation**
         - "Nodular opacity" → **Imaging observation**
         - "Pulmonary nodules" → **Imaging observation**
         - "Chronic interstitial pneumonia" → **Physiologic condition**
   - **4. Physical object**: Any external or internal object mentioned in the report (e.g., "stent", "catheter", "surgical clip").
       - **Important clarification**: Physical object must refer to an artificially introduced or external structure. Natural formations within the body, even if they resemble objects (e.g., stones, calculi), should not be categorized here. Instead, classify them as 2. Physiologic condition if they indicate a pathological state.
   - **5. Procedure**: Any medical or surgical process or action (e.g., "biopsy", "contrast-enhanced CT scan", "follow up procedure").
   - **6. Others**: Use this category if the unit does not fit into the above categories (e.g., "clinical information section") or the meaning is unclear.

3. Follow these **Important Rules** when creating the lexicon units:
   - A single lexicon unit **must not mix categories**. For example:
     - Incorrect: "renal mass and biopsy procedure".
     - Correct: ["renal mass", "biopsy procedure"].
   - Findings and locations must be **split into separate units**:
     - Example 1: "consolidation in lower lobe of right lung" → ["consolidation", "lower lobe of right lung"].
     - Example 2: "nodular opacity in upper lobe of left lung" → ["nodular opacity", "upper lobe of left lung"].
   - **Handle conjunctions properly**:
     - If items are connected by "and", "or", or similar conjunctions, split them into separate units:
       - Example: "biopsy or surgery" → ["biopsy", "surgery"].
     - If conjunctions are missing but implied, infer the separation:
       - Example: "diffuse ground-glass opacity consolidation nodular opacity" → ["diffuse ground-glass opacity", "consolidation", "nodular opacity"].
     - For anatomical locations connected by "and" or "or", ensure each is expanded to a fully described location before splitting:
       - Example: "right internal mammary and left axillary lymph node" → ["right internal mammary lymph node", "left axillary lymph node"].

   - **Avoid overly long units**:
     - Long expressions should be split into smaller meaningful components:
       - Example: "low attenuating lesion in right thyroid gland" → ["low attenuating lesion", "right thyroid gland"].

4. Always ensure:
   - The original word order is preserved.
   - Typos are corrected, and meaningless words are removed or replaced during the correction process.
   - findings and locations must be split into separate units

### Additional Guidance for Ambiguous Cases:
- When terms seem ambiguous, follow these guidelines:
  1. **Check for explicit imaging-related descriptors**:
     - Words like "opacity", "pattern", "margin", "enhancement" often indicate **Imaging observation**.
  2. **Default to Physiologic condition**:
     - If a term could describe a general condition without clear imaging context, assign it to **Physiologic condition**.
  3. **Complex units**:
     - Break down terms with both a visual and physiologic aspect:
       - Example: "reticular opacity of lung fibrosis" → ["reticular opacity", "lung fibrosis"].

Format the output as JSON:
{
  "reports": [
    {
      "report_index": <index within group>,
      "lexicon_units": [
        {"unit": "<unit1>", "category": <category_number>},
        {"unit": "<unit2>", "category": <category_number>},
        ...
      ]
    }
    ...
  ]
}

Example reports:
Report 1: "reticular opacity and consolidation in lower lobe of right lung superior segment bronchial wall thickening and centrilobular nodule in upper lobe of left lung peripheral portion"
Expected output:
{
  "report_index": 1,
  "lexicon_units": [
    {"unit": "reticular opacity", "category": 3},
    {"unit": "consolidation", "category": 2},
    {"unit": "lower lobe of right lung superior segment", "category": 1},
    {"unit": "bronchial wall thickening", "category": 3},
    {"unit": "centrilobular nodule", "category": 3},
    {"unit": "upper lobe of left lung", "category": 1},
    {"unit": "peripheral portion", "category": 1},
  ]
}

Reports:"#;

/// 拼装同义词任务的单批提示词，批内词条顺序保持不变
pub fn build_synonym_prompt(group: &[String]) -> String {
    let combined_terms = group.join(TERM_SEPARATOR);
    format!("{}\n{}", SYNONYM_INSTRUCTIONS, combined_terms)
}

/// 拼装词元解析任务的单批提示词，批内报告顺序保持不变
pub fn build_unit_parsing_prompt(group: &[String]) -> String {
    let combined_reports = group.join(REPORT_SEPARATOR);
    format!("{}\n{}", UNIT_PARSING_INSTRUCTIONS, combined_reports)
}
