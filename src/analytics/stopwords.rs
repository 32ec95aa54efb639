//! Spanish stopword list and sentiment lexicons
//!
//! The stopword list extends the usual Spanish function words with newsroom
//! verbs ("dijo", "señaló") and filler nouns common in local reporting. All
//! entries are lowercase and keep their accents.

use std::collections::HashSet;

use lazy_static::lazy_static;

const STOPWORDS_ES: &[&str] = &[
    "de", "la", "que", "el", "en", "y", "a", "los", "del", "se", "las", "por",
    "un", "para", "con", "no", "una", "su", "al", "lo", "como", "más", "pero",
    "sus", "le", "ya", "o", "este", "sí", "porque", "esta", "entre", "cuando",
    "muy", "sin", "sobre", "también", "me", "hasta", "hay", "donde", "quien",
    "desde", "todo", "nos", "durante", "todos", "uno", "les", "ni", "contra",
    "otros", "ese", "eso", "ante", "ellos", "e", "esto", "mí", "antes", "algunos",
    "qué", "unos", "yo", "otro", "otras", "otra", "él", "tanto", "esa", "estos",
    "mucho", "quienes", "nada", "muchos", "cual", "poco", "ella", "estar", "estas",
    "algunas", "algo", "nosotros", "mi", "mis", "tú", "te", "ti", "tu", "tus",
    "ellas", "nosotras", "vosotros", "vosotras", "os", "mío", "mía", "míos", "mías",
    "tuyo", "tuya", "tuyos", "tuyas", "suyo", "suya", "suyos", "suyas", "nuestro",
    "nuestra", "nuestros", "nuestras", "vuestro", "vuestra", "vuestros", "vuestras",
    "esos", "esas", "estoy", "estás", "está", "estamos", "estáis", "están", "esté",
    "estés", "estemos", "estéis", "estén", "estaré", "estarás", "estará", "estaremos",
    "estaréis", "estarán", "estaría", "estarías", "estaríamos", "estaríais", "estarían",
    "estaba", "estabas", "estábamos", "estabais", "estaban", "estuve", "estuviste",
    "estuvo", "estuvimos", "estuvisteis", "estuvieron", "estuviera", "estuvieras",
    "estuviéramos", "estuvierais", "estuvieran", "estuviese", "estuvieses",
    "estuviésemos", "estuvieseis", "estuviesen", "estando", "estado", "estada",
    "estados", "estadas", "estad", "he", "has", "ha", "hemos", "habéis", "han",
    "haya", "hayas", "hayamos", "hayáis", "hayan", "habré", "habrás", "habrá",
    "habremos", "habréis", "habrán", "habría", "habrías", "habríamos", "habríais",
    "habrían", "había", "habías", "habíamos", "habíais", "habían", "hube", "hubiste",
    "hubo", "hubimos", "hubisteis", "hubieron", "hubiera", "hubieras", "hubiéramos",
    "hubierais", "hubieran", "hubiese", "hubieses", "hubiésemos", "hubieseis",
    "hubiesen", "habiendo", "habido", "habida", "habidos", "habidas", "soy", "eres",
    "es", "somos", "sois", "son", "sea", "seas", "seamos", "seáis", "sean", "seré",
    "serás", "será", "seremos", "seréis", "serán", "sería", "serías", "seríamos",
    "seríais", "serían", "era", "eras", "éramos", "erais", "eran", "fui", "fuiste",
    "fue", "fuimos", "fuisteis", "fueron", "fuera", "fueras", "fuéramos", "fuerais",
    "fueran", "fuese", "fueses", "fuésemos", "fueseis", "fuesen", "siendo", "sido",
    "tengo", "tienes", "tiene", "tenemos", "tenéis", "tienen", "tenga", "tengas",
    "tengamos", "tengáis", "tengan", "tendré", "tendrás", "tendrá", "tendremos",
    "tendréis", "tendrán", "tendría", "tendrías", "tendríamos", "tendríais", "tendrían",
    "tenía", "tenías", "teníamos", "teníais", "tenían", "tuve", "tuviste", "tuvo",
    "tuvimos", "tuvisteis", "tuvieron", "tuviera", "tuvieras", "tuviéramos", "tuvierais",
    "tuvieran", "tuviese", "tuvieses", "tuviésemos", "tuvieseis", "tuviesen", "teniendo",
    "tenido", "tenida", "tenidos", "tenidas", "tened", "así", "cada", "hacer", "hecho",
    "puede", "pueden", "podría", "dijo", "señaló", "indicó", "afirmó", "explicó",
    "comentó", "añadió", "aseguró", "manifestó", "expresó", "destacó", "informó",
    "año", "años", "día", "días", "vez", "veces", "parte", "además", "ahora", "después",
    "dos", "tres", "primer", "primera", "segundo", "nueva", "nuevo", "solo", "tras",
    "siempre", "menos", "según", "ser", "ver", "ir", "dar", "decir",
    "mismo", "misma", "mismos", "mismas", "luego", "bien", "manera", "forma",
    "caso", "entonces", "mientras", "aunque", "embargo", "debe", "hacia",
    "pues", "pasado", "haber", "través", "medio", "cuenta", "punto", "general",
    "tan", "ciento", "mil", "millones", "pesos", "ciudad",
];

const POSITIVE_WORDS_ES: &[&str] = &[
    "éxito", "exito", "logro", "lograr", "avance", "mejora", "mejorar", "beneficio",
    "beneficiar", "positivo", "crecimiento", "crecer", "desarrollo", "desarrollar",
    "apoyo", "apoyar", "acuerdo", "colaboración", "colaborar", "progreso", "progresar",
    "inversión", "invertir", "oportunidad", "solución", "resolver", "victoria",
    "ganar", "celebrar", "celebración", "inaugurar", "inauguración", "reconocimiento",
    "reconocer", "premio", "premiar", "felicitar", "felicitación", "bienestar",
    "esperanza", "optimismo", "optimista", "satisfacción", "satisfecho", "excelente",
    "extraordinario", "notable", "destacado", "sobresaliente", "impresionante",
    "maravilloso", "fantástico", "increíble", "espectacular", "triunfo", "triunfar",
];

const NEGATIVE_WORDS_ES: &[&str] = &[
    "crisis", "problema", "problemático", "conflicto", "violencia", "violento",
    "muerte", "muerto", "matar", "asesinar", "asesinato", "homicidio", "ejecutar",
    "ejecutado", "secuestro", "secuestrar", "robo", "robar", "asalto", "asaltar",
    "corrupción", "corrupto", "fraude", "fraudulento", "desvío", "malversación",
    "escándalo", "acusación", "acusar", "denunciar", "denuncia", "delito", "crimen",
    "criminal", "narcotráfico", "narco", "cartel", "zetas", "cjng", "balacera",
    "enfrentamiento", "inseguridad", "peligro", "peligroso", "amenaza", "amenazar",
    "extorsión", "extorsionar", "desaparición", "desaparecer", "desaparecido",
    "víctima", "tragedia", "trágico", "desastre", "devastación", "destrucción",
    "destruir", "daño", "dañar", "pérdida", "perder", "fracaso", "fracasar",
    "rechazo", "rechazar", "protesta", "protestar", "manifestación", "bloqueo",
    "bloquear", "huelga", "paro", "negligencia", "negligente", "incompetencia",
    "incompetente", "impunidad", "injusticia", "ilegal", "irregularidad",
];

lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = STOPWORDS_ES.iter().copied().collect();
    static ref POSITIVE: HashSet<&'static str> = POSITIVE_WORDS_ES.iter().copied().collect();
    static ref NEGATIVE: HashSet<&'static str> = NEGATIVE_WORDS_ES.iter().copied().collect();
}

/// Whether a lowercase word is a Spanish stopword
#[must_use]
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// The full stopword set
#[must_use]
pub fn stopwords() -> &'static HashSet<&'static str> {
    &STOPWORDS
}

#[must_use]
pub fn is_positive(word: &str) -> bool {
    POSITIVE.contains(word)
}

#[must_use]
pub fn is_negative(word: &str) -> bool {
    NEGATIVE.contains(word)
}
