//! Double Metaphone phonetic encoding.
//!
//! Produces a primary and a secondary code of at most four characters. The
//! secondary code is empty unless some rule offered an alternate
//! pronunciation.

const MAX_CODE_LEN: usize = 4;
const PADDING: usize = 5;

/// Encode a value into its (primary, secondary) Double Metaphone codes.
pub fn double_metaphone(value: &str) -> (String, String) {
    let mut encoder = Encoder::new(value);
    encoder.encode();
    encoder.finish()
}

struct Encoder {
    chars: Vec<char>,
    length: usize,
    last: usize,
    primary: String,
    secondary: String,
    alternate: bool,
    slavo_germanic: bool,
}

impl Encoder {
    fn new(value: &str) -> Self {
        let chars: Vec<char> = value.to_uppercase().chars().collect();
        let length = chars.len();
        let text: String = chars.iter().collect();
        let slavo_germanic = text.contains('W')
            || text.contains('K')
            || text.contains("CZ")
            || text.contains("WITZ");

        Self {
            chars,
            length,
            last: length.saturating_sub(1),
            primary: String::new(),
            secondary: String::new(),
            alternate: false,
            slavo_germanic,
        }
    }

    fn finish(self) -> (String, String) {
        let primary: String = self.primary.chars().take(MAX_CODE_LEN).collect();
        let secondary = if self.alternate {
            self.secondary.chars().take(MAX_CODE_LEN).collect()
        } else {
            String::new()
        };
        (primary, secondary)
    }

    /// Character at a position; positions past the end read as padding.
    fn at(&self, pos: isize) -> char {
        if pos < 0 {
            return '\0';
        }
        let pos = pos as usize;
        if pos < self.length {
            self.chars[pos]
        } else if pos < self.length + PADDING {
            ' '
        } else {
            '\0'
        }
    }

    fn is_vowel(&self, pos: isize) -> bool {
        if pos < 0 || pos as usize >= self.length {
            return false;
        }
        matches!(self.chars[pos as usize], 'A' | 'E' | 'I' | 'O' | 'U' | 'Y')
    }

    fn string_at(&self, start: isize, len: usize, options: &[&str]) -> bool {
        if start < 0 {
            return false;
        }
        let window: String = (0..len).map(|i| self.at(start + i as isize)).collect();
        options.iter().any(|option| *option == window)
    }

    fn add(&mut self, main: &str) {
        self.primary.push_str(main);
        self.secondary.push_str(main);
    }

    fn add_alt(&mut self, main: &str, alt: &str) {
        self.primary.push_str(main);
        if !alt.is_empty() {
            self.alternate = true;
            if !alt.starts_with(' ') {
                self.secondary.push_str(alt);
            }
        } else if !main.is_empty() && !main.starts_with(' ') {
            self.secondary.push_str(main);
        }
    }

    fn germanic_prefix(&self) -> bool {
        self.string_at(0, 4, &["VAN ", "VON "]) || self.string_at(0, 3, &["SCH"])
    }

    fn encode(&mut self) {
        if self.length == 0 {
            return;
        }

        let mut current: isize = 0;
        if self.string_at(0, 2, &["GN", "KN", "PN", "WR", "PS"]) {
            current += 1;
        }
        if self.at(0) == 'X' {
            self.add("S");
            current += 1;
        }

        while self.primary.len() < MAX_CODE_LEN || self.secondary.len() < MAX_CODE_LEN {
            if current as usize >= self.length {
                break;
            }
            current = match self.at(current) {
                'A' | 'E' | 'I' | 'O' | 'U' | 'Y' => {
                    if current == 0 {
                        self.add("A");
                    }
                    current + 1
                }
                'B' => {
                    self.add("P");
                    if self.at(current + 1) == 'B' { current + 2 } else { current + 1 }
                }
                'Ç' => {
                    self.add("S");
                    current + 1
                }
                'C' => self.encode_c(current),
                'D' => self.encode_d(current),
                'F' => {
                    self.add("F");
                    if self.at(current + 1) == 'F' { current + 2 } else { current + 1 }
                }
                'G' => self.encode_g(current),
                'H' => {
                    if (current == 0 || self.is_vowel(current - 1)) && self.is_vowel(current + 1) {
                        self.add("H");
                        current + 2
                    } else {
                        current + 1
                    }
                }
                'J' => self.encode_j(current),
                'K' => {
                    self.add("K");
                    if self.at(current + 1) == 'K' { current + 2 } else { current + 1 }
                }
                'L' => self.encode_l(current),
                'M' => {
                    let skip = (self.string_at(current - 1, 3, &["UMB"])
                        && (current + 1 == self.last as isize
                            || self.string_at(current + 2, 2, &["ER"])))
                        || self.at(current + 1) == 'M';
                    self.add("M");
                    if skip { current + 2 } else { current + 1 }
                }
                'N' => {
                    self.add("N");
                    if self.at(current + 1) == 'N' { current + 2 } else { current + 1 }
                }
                'Ñ' => {
                    self.add("N");
                    current + 1
                }
                'P' => {
                    if self.at(current + 1) == 'H' {
                        self.add("F");
                        current + 2
                    } else {
                        self.add("P");
                        if self.string_at(current + 1, 1, &["P", "B"]) {
                            current + 2
                        } else {
                            current + 1
                        }
                    }
                }
                'Q' => {
                    self.add("K");
                    if self.at(current + 1) == 'Q' { current + 2 } else { current + 1 }
                }
                'R' => {
                    if current == self.last as isize
                        && !self.slavo_germanic
                        && self.string_at(current - 2, 2, &["IE"])
                        && !self.string_at(current - 4, 2, &["ME", "MA"])
                    {
                        self.add_alt("", "R");
                    } else {
                        self.add("R");
                    }
                    if self.at(current + 1) == 'R' { current + 2 } else { current + 1 }
                }
                'S' => self.encode_s(current),
                'T' => self.encode_t(current),
                'V' => {
                    self.add("F");
                    if self.at(current + 1) == 'V' { current + 2 } else { current + 1 }
                }
                'W' => self.encode_w(current),
                'X' => {
                    let silent_french = current == self.last as isize
                        && (self.string_at(current - 3, 3, &["IAU", "EAU"])
                            || self.string_at(current - 2, 2, &["AU", "OU"]));
                    if !silent_french {
                        self.add("KS");
                    }
                    if self.string_at(current + 1, 1, &["C", "X"]) {
                        current + 2
                    } else {
                        current + 1
                    }
                }
                'Z' => self.encode_z(current),
                _ => current + 1,
            };
        }
    }

    fn encode_c(&mut self, current: isize) -> isize {
        // Germanic "-ach-" as in "bacher"
        if current > 1
            && !self.is_vowel(current - 2)
            && self.string_at(current - 1, 3, &["ACH"])
            && self.at(current + 2) != 'I'
            && (self.at(current + 2) != 'E'
                || self.string_at(current - 2, 6, &["BACHER", "MACHER"]))
        {
            self.add("K");
            return current + 2;
        }

        if current == 0 && self.string_at(current, 6, &["CAESAR"]) {
            self.add("S");
            return current + 2;
        }

        if self.string_at(current, 4, &["CHIA"]) {
            self.add("K");
            return current + 2;
        }

        if self.string_at(current, 2, &["CH"]) {
            if current > 0 && self.string_at(current, 4, &["CHAE"]) {
                self.add_alt("K", "X");
                return current + 2;
            }

            // Greek roots, e.g. "chemistry", "chorus"
            if current == 0
                && (self.string_at(current + 1, 5, &["HARAC", "HARIS"])
                    || self.string_at(current + 1, 3, &["HOR", "HYM", "HIA", "HEM"]))
                && !self.string_at(0, 5, &["CHORE"])
            {
                self.add("K");
                return current + 2;
            }

            if self.germanic_prefix()
                || self.string_at(current - 2, 6, &["ORCHES", "ARCHIT", "ORCHID"])
                || self.string_at(current + 2, 1, &["T", "S"])
                || ((self.string_at(current - 1, 1, &["A", "O", "U", "E"]) || current == 0)
                    && self.string_at(
                        current + 2,
                        1,
                        &["L", "R", "N", "M", "B", "H", "F", "V", "W", " "],
                    ))
            {
                self.add("K");
            } else if current > 0 {
                if self.string_at(0, 2, &["MC"]) {
                    self.add("K");
                } else {
                    self.add_alt("X", "K");
                }
            } else {
                self.add("X");
            }
            return current + 2;
        }

        if self.string_at(current, 2, &["CZ"]) && !self.string_at(current - 2, 4, &["WICZ"]) {
            self.add_alt("S", "X");
            return current + 2;
        }

        if self.string_at(current + 1, 3, &["CIA"]) {
            self.add("X");
            return current + 3;
        }

        // Double C, but not "McClellan"
        if self.string_at(current, 2, &["CC"]) && !(current == 1 && self.at(0) == 'M') {
            if self.string_at(current + 2, 1, &["I", "E", "H"])
                && !self.string_at(current + 2, 2, &["HU"])
            {
                if (current == 1 && self.at(current - 1) == 'A')
                    || self.string_at(current - 1, 5, &["UCCEE", "UCCES"])
                {
                    self.add("KS");
                } else {
                    self.add("X");
                }
                return current + 3;
            }
            self.add("K");
            return current + 2;
        }

        if self.string_at(current, 2, &["CK", "CG", "CQ"]) {
            self.add("K");
            return current + 2;
        }

        if self.string_at(current, 2, &["CI", "CE", "CY"]) {
            if self.string_at(current, 3, &["CIO", "CIE", "CIA"]) {
                self.add_alt("S", "X");
            } else {
                self.add("S");
            }
            return current + 2;
        }

        self.add("K");
        if self.string_at(current + 1, 2, &[" C", " Q", " G"]) {
            current + 3
        } else if self.string_at(current + 1, 1, &["C", "K", "Q"])
            && !self.string_at(current + 1, 2, &["CE", "CI"])
        {
            current + 2
        } else {
            current + 1
        }
    }

    fn encode_d(&mut self, current: isize) -> isize {
        if self.string_at(current, 2, &["DG"]) {
            if self.string_at(current + 2, 1, &["I", "E", "Y"]) {
                self.add("J");
                return current + 3;
            }
            self.add("TK");
            return current + 2;
        }

        self.add("T");
        if self.string_at(current, 2, &["DT", "DD"]) {
            current + 2
        } else {
            current + 1
        }
    }

    fn encode_g(&mut self, current: isize) -> isize {
        if self.at(current + 1) == 'H' {
            if current > 0 && !self.is_vowel(current - 1) {
                self.add("K");
                return current + 2;
            }

            if current == 0 {
                if self.at(current + 2) == 'I' {
                    self.add("J");
                } else {
                    self.add("K");
                }
                return current + 2;
            }

            // Parker's rule, e.g. "hugh", "bough", "broughton"
            if (current > 1 && self.string_at(current - 2, 1, &["B", "H", "D"]))
                || (current > 2 && self.string_at(current - 3, 1, &["B", "H", "D"]))
                || (current > 3 && self.string_at(current - 4, 1, &["B", "H"]))
            {
                return current + 2;
            }

            if current > 2
                && self.at(current - 1) == 'U'
                && self.string_at(current - 3, 1, &["C", "G", "L", "R", "T"])
            {
                self.add("F");
            } else if current > 0 && self.at(current - 1) != 'I' {
                self.add("K");
            }
            return current + 2;
        }

        if self.at(current + 1) == 'N' {
            if current == 1 && self.is_vowel(0) && !self.slavo_germanic {
                self.add_alt("KN", "N");
            } else if !self.string_at(current + 2, 2, &["EY"])
                && self.at(current + 1) != 'Y'
                && !self.slavo_germanic
            {
                self.add_alt("N", "KN");
            } else {
                self.add("KN");
            }
            return current + 2;
        }

        if self.string_at(current + 1, 2, &["LI"]) && !self.slavo_germanic {
            self.add_alt("KL", "L");
            return current + 2;
        }

        if current == 0
            && (self.at(current + 1) == 'Y'
                || self.string_at(
                    current + 1,
                    2,
                    &["ES", "EP", "EB", "EL", "EY", "IB", "IL", "IN", "IE", "EI", "ER"],
                ))
        {
            self.add_alt("K", "J");
            return current + 2;
        }

        if (self.string_at(current + 1, 2, &["ER"]) || self.at(current + 1) == 'Y')
            && !self.string_at(0, 6, &["DANGER", "RANGER", "MANGER"])
            && !self.string_at(current - 1, 1, &["E", "I"])
            && !self.string_at(current - 1, 3, &["RGY", "OGY"])
        {
            self.add_alt("K", "J");
            return current + 2;
        }

        // Italian, e.g. "biaggi"
        if self.string_at(current + 1, 1, &["E", "I", "Y"])
            || self.string_at(current - 1, 4, &["AGGI", "OGGI"])
        {
            if self.germanic_prefix() || self.string_at(current + 1, 2, &["ET"]) {
                self.add("K");
            } else if self.string_at(current + 1, 4, &["IER "]) {
                self.add("J");
            } else {
                self.add_alt("J", "K");
            }
            return current + 2;
        }

        self.add("K");
        if self.at(current + 1) == 'G' {
            current + 2
        } else {
            current + 1
        }
    }

    fn encode_j(&mut self, current: isize) -> isize {
        // Spanish, e.g. "jose", "san jacinto"
        if self.string_at(current, 4, &["JOSE"]) || self.string_at(0, 4, &["SAN "]) {
            if (current == 0 && self.at(current + 4) == ' ') || self.string_at(0, 4, &["SAN "]) {
                self.add("H");
            } else {
                self.add_alt("J", "H");
            }
            return current + 1;
        }

        if current == 0 && !self.string_at(current, 4, &["JOSE"]) {
            self.add_alt("J", "A");
        } else if self.is_vowel(current - 1)
            && !self.slavo_germanic
            && (self.at(current + 1) == 'A' || self.at(current + 1) == 'O')
        {
            self.add_alt("J", "H");
        } else if current == self.last as isize {
            self.add_alt("J", " ");
        } else if !self.string_at(current + 1, 1, &["L", "T", "K", "S", "N", "M", "B", "Z"])
            && !self.string_at(current - 1, 1, &["S", "K", "L"])
        {
            self.add("J");
        }

        if self.at(current + 1) == 'J' {
            current + 2
        } else {
            current + 1
        }
    }

    fn encode_l(&mut self, current: isize) -> isize {
        if self.at(current + 1) == 'L' {
            let last = self.last as isize;
            // Spanish, e.g. "cabrillo", "gallegos"
            if (current == self.length as isize - 3
                && self.string_at(current - 1, 4, &["ILLO", "ILLA", "ALLE"]))
                || ((self.string_at(last - 1, 2, &["AS", "OS"])
                    || self.string_at(last, 1, &["A", "O"]))
                    && self.string_at(current - 1, 4, &["ALLE"]))
            {
                self.add_alt("L", " ");
                return current + 2;
            }
            self.add("L");
            return current + 2;
        }
        self.add("L");
        current + 1
    }

    fn encode_s(&mut self, current: isize) -> isize {
        // "island", "isle", "carlysle"
        if self.string_at(current - 1, 3, &["ISL", "YSL"]) {
            return current + 1;
        }

        if current == 0 && self.string_at(current, 5, &["SUGAR"]) {
            self.add_alt("X", "S");
            return current + 1;
        }

        if self.string_at(current, 2, &["SH"]) {
            if self.string_at(current + 1, 4, &["HEIM", "HOEK", "HOLM", "HOLZ"]) {
                self.add("S");
            } else {
                self.add("X");
            }
            return current + 2;
        }

        if self.string_at(current, 3, &["SIO", "SIA"]) || self.string_at(current, 4, &["SIAN"]) {
            if !self.slavo_germanic {
                self.add_alt("S", "X");
            } else {
                self.add("S");
            }
            return current + 3;
        }

        // "smith" matches "schmidt", "snider" matches "schneider"
        if (current == 0 && self.string_at(current + 1, 1, &["M", "N", "L", "W"]))
            || self.string_at(current + 1, 1, &["Z"])
        {
            self.add_alt("S", "X");
            return if self.string_at(current + 1, 1, &["Z"]) {
                current + 2
            } else {
                current + 1
            };
        }

        if self.string_at(current, 2, &["SC"]) {
            // Schlesinger's rule
            if self.at(current + 2) == 'H' {
                if self.string_at(current + 3, 2, &["OO", "ER", "EN", "UY", "ED", "EM"]) {
                    if self.string_at(current + 3, 2, &["ER", "EN"]) {
                        self.add_alt("X", "SK");
                    } else {
                        self.add("SK");
                    }
                } else if current == 0 && !self.is_vowel(3) && self.at(3) != 'W' {
                    self.add_alt("X", "S");
                } else {
                    self.add("X");
                }
                return current + 3;
            }

            if self.string_at(current + 2, 1, &["I", "E", "Y"]) {
                self.add("S");
            } else {
                self.add("SK");
            }
            return current + 3;
        }

        // French, e.g. "resnais", "artois"
        if current == self.last as isize && self.string_at(current - 2, 2, &["AI", "OI"]) {
            self.add_alt("", "S");
        } else {
            self.add("S");
        }

        if self.string_at(current + 1, 1, &["S", "Z"]) {
            current + 2
        } else {
            current + 1
        }
    }

    fn encode_t(&mut self, current: isize) -> isize {
        if self.string_at(current, 4, &["TION"]) || self.string_at(current, 3, &["TIA", "TCH"]) {
            self.add("X");
            return current + 3;
        }

        if self.string_at(current, 2, &["TH"]) || self.string_at(current, 3, &["TTH"]) {
            if self.string_at(current + 2, 2, &["OM", "AM"]) || self.germanic_prefix() {
                self.add("T");
            } else {
                self.add_alt("0", "T");
            }
            return current + 2;
        }

        self.add("T");
        if self.string_at(current + 1, 1, &["T", "D"]) {
            current + 2
        } else {
            current + 1
        }
    }

    fn encode_w(&mut self, current: isize) -> isize {
        if self.string_at(current, 2, &["WR"]) {
            self.add("R");
            return current + 2;
        }

        if current == 0 && (self.is_vowel(current + 1) || self.string_at(current, 2, &["WH"])) {
            if self.is_vowel(current + 1) {
                self.add_alt("A", "F");
            } else {
                self.add("A");
            }
        }

        // "arnow" matches "arnoff"
        if (current == self.last as isize && self.is_vowel(current - 1))
            || self.string_at(current - 1, 5, &["EWSKI", "EWSKY", "OWSKI", "OWSKY"])
            || self.string_at(0, 3, &["SCH"])
        {
            self.add_alt("", "F");
            return current + 1;
        }

        if self.string_at(current, 4, &["WICZ", "WITZ"]) {
            self.add_alt("TS", "FX");
            return current + 4;
        }

        current + 1
    }

    fn encode_z(&mut self, current: isize) -> isize {
        // Pinyin, e.g. "zhao"
        if self.at(current + 1) == 'H' {
            self.add("J");
            return current + 2;
        }

        if self.string_at(current + 1, 2, &["ZO", "ZI", "ZA"])
            || (self.slavo_germanic && current > 0 && self.at(current - 1) != 'T')
        {
            self.add_alt("S", "TS");
        } else {
            self.add("S");
        }

        if self.at(current + 1) == 'Z' {
            current + 2
        } else {
            current + 1
        }
    }
}
