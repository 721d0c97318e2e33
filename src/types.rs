use crate::error::EngineError;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn from_char(c: char) -> Result<Color, EngineError> {
        match c {
            'w' => Ok(Color::White),
            'b' => Ok(Color::Black),
            other => Err(EngineError::BadActiveColor(other)),
        }
    }

    /// Color of a piece letter in board-description strings: uppercase is
    /// white, lowercase is black.
    pub fn from_case(c: char) -> Color {
        if c.is_uppercase() {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn other_color(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn to_human(&self) -> &str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PieceType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceType {
    pub fn from_char(c: char) -> Result<PieceType, EngineError> {
        match c.to_ascii_lowercase() {
            'p' => Ok(PieceType::Pawn),
            'r' => Ok(PieceType::Rook),
            'n' => Ok(PieceType::Knight),
            'b' => Ok(PieceType::Bishop),
            'q' => Ok(PieceType::Queen),
            'k' => Ok(PieceType::King),
            other => Err(EngineError::BadPieceChar(other)),
        }
    }

    /// Is the piece a sliding piece (one which can move multiple squares in a
    /// given direction)
    pub fn is_sliding(&self) -> bool {
        matches!(self, PieceType::Rook | PieceType::Bishop | PieceType::Queen)
    }

    pub fn to_human(&self) -> &str {
        match self {
            Self::Pawn => "pawn",
            Self::Rook => "rook",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Rook => 'r',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        match self {
            PieceType::Pawn => 0,
            PieceType::Rook => 1,
            PieceType::Knight => 2,
            PieceType::Bishop => 3,
            PieceType::Queen => 4,
            PieceType::King => 5,
        }
    }

    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Rook,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Queen,
        PieceType::King,
    ];
}

pub const PIECES_CAN_PROMOTE_TO: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

/// A colored piece, the cross product of [`Color`] and [`PieceType`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Piece {
    pub color: Color,
    pub piece_type: PieceType,
}

impl Piece {
    pub fn new(color: Color, piece_type: PieceType) -> Piece {
        Piece { color, piece_type }
    }

    pub fn from_char(c: char) -> Result<Piece, EngineError> {
        Ok(Piece {
            color: Color::from_case(c),
            piece_type: PieceType::from_char(c)?,
        })
    }

    /// Canonical one-character notation symbol: uppercase for white,
    /// lowercase for black.
    pub fn to_char(&self) -> char {
        match self.color {
            Color::White => self.piece_type.to_char().to_ascii_uppercase(),
            Color::Black => self.piece_type.to_char(),
        }
    }

    pub fn to_symbol(&self) -> &str {
        let is_white = self.color == Color::White;
        match self.piece_type {
            PieceType::Pawn => {
                if is_white {
                    "♙"
                } else {
                    "♟︎"
                }
            }
            PieceType::Rook => {
                if is_white {
                    "♖"
                } else {
                    "♜"
                }
            }
            PieceType::Knight => {
                if is_white {
                    "♘"
                } else {
                    "♞"
                }
            }
            PieceType::Bishop => {
                if is_white {
                    "♗"
                } else {
                    "♝"
                }
            }
            PieceType::Queen => {
                if is_white {
                    "♕"
                } else {
                    "♛"
                }
            }
            PieceType::King => {
                if is_white {
                    "♔"
                } else {
                    "♚"
                }
            }
        }
    }
}

/// One of the 64 board cells. Wraps the bit index `rank * 8 + file`
/// (a1 = 0, b1 = 1, ..., h8 = 63); file and rank are 0-indexed.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Square(pub u8);

impl Square {
    pub fn from_file_rank(file: u8, rank: u8) -> Square {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    pub fn from_algebraic(s: &str) -> Result<Square, EngineError> {
        let mut chars = s.chars();
        let (file_char, rank_char) = match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(r), None) => (f, r),
            _ => return Err(EngineError::InvalidSquare(s.to_string())),
        };
        if !('a'..='h').contains(&file_char) || !('1'..='8').contains(&rank_char) {
            return Err(EngineError::InvalidSquare(s.to_string()));
        }
        let file = file_char as u8 - b'a';
        let rank = rank_char as u8 - b'1';
        Ok(Square::from_file_rank(file, rank))
    }

    pub fn to_algebraic(&self) -> String {
        format!("{}{}", (self.file() + b'a') as char, self.rank() + 1)
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// File index 0-7 (a-h)
    #[inline(always)]
    pub fn file(&self) -> u8 {
        self.0 & 7
    }

    /// Rank index 0-7 (1-8)
    #[inline(always)]
    pub fn rank(&self) -> u8 {
        self.0 >> 3
    }

    /// Single-bit occupancy mask for this square
    #[inline(always)]
    pub fn bb(&self) -> u64 {
        1u64 << self.0
    }

    /// Translate one step in the given direction, or `None` past the board
    /// edge.
    pub fn shift(&self, direction: Direction) -> Option<Square> {
        let (df, dr) = direction.deltas();
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square::from_file_rank(file as u8, rank as u8))
        } else {
            None
        }
    }
}

/// Classification grouping directions by the piece family that uses them.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DirectionKind {
    /// Rook-like rays
    Orthogonal,
    /// Bishop-like rays
    Diagonal,
    /// Knight leaps
    Knight,
}

/// One of the 16 ray directions: 4 orthogonal, 4 diagonal, 8 knight leaps.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    North,
    East,
    South,
    West,
    NorthEast,
    SouthEast,
    SouthWest,
    NorthWest,
    // knight leaps, named by their long-then-short compass legs
    NorthNorthEast,
    EastNorthEast,
    EastSouthEast,
    SouthSouthEast,
    SouthSouthWest,
    WestSouthWest,
    WestNorthWest,
    NorthNorthWest,
}

impl Direction {
    /// (file delta, rank delta) of one step in this direction
    pub const fn deltas(&self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, 1),
            Direction::SouthEast => (1, -1),
            Direction::SouthWest => (-1, -1),
            Direction::NorthWest => (-1, 1),
            Direction::NorthNorthEast => (1, 2),
            Direction::EastNorthEast => (2, 1),
            Direction::EastSouthEast => (2, -1),
            Direction::SouthSouthEast => (1, -2),
            Direction::SouthSouthWest => (-1, -2),
            Direction::WestSouthWest => (-2, -1),
            Direction::WestNorthWest => (-2, 1),
            Direction::NorthNorthWest => (-1, 2),
        }
    }

    pub const fn kind(&self) -> DirectionKind {
        match self {
            Direction::North | Direction::East | Direction::South | Direction::West => {
                DirectionKind::Orthogonal
            }
            Direction::NorthEast
            | Direction::SouthEast
            | Direction::SouthWest
            | Direction::NorthWest => DirectionKind::Diagonal,
            _ => DirectionKind::Knight,
        }
    }

    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    pub const KNIGHT: [Direction; 8] = [
        Direction::NorthNorthEast,
        Direction::EastNorthEast,
        Direction::EastSouthEast,
        Direction::SouthSouthEast,
        Direction::SouthSouthWest,
        Direction::WestSouthWest,
        Direction::WestNorthWest,
        Direction::NorthNorthWest,
    ];

    pub const COMPASS: [Direction; 8] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];
}

/// Outcome of a finished (or force-drawn) game.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status {
    /// The contained color is the one that has been mated.
    Checkmate(Color),
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveFlag {
    Regular,
    CastleKingside,
    CastleQueenside,
    /// Pawn promotion. Contains the piece promoted to.
    Promotion(PieceType),
    /// Double pawn push from the starting rank.
    DoublePawnPush,
    EnPassantCapture,
}

impl MoveFlag {
    pub fn is_castle(&self) -> bool {
        matches!(self, MoveFlag::CastleKingside | MoveFlag::CastleQueenside)
    }
}

/// An immutable descriptor of a single ply.
///
/// Two moves are equal iff source, target, moving piece and promotion piece
/// match; the capture annotation and push/castle flags are bookkeeping for
/// make/unmake and do not take part in identity.
#[derive(Debug, Clone, Copy)]
pub struct Move {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub captured: Option<PieceType>,
    pub flag: MoveFlag,
}

impl Move {
    pub fn new(piece: Piece, from: Square, to: Square, captured: Option<PieceType>) -> Self {
        Self {
            piece,
            from,
            to,
            captured,
            flag: MoveFlag::Regular,
        }
    }

    pub fn promotion(&self) -> Option<PieceType> {
        match self.flag {
            MoveFlag::Promotion(piece_type) => Some(piece_type),
            _ => None,
        }
    }

    /// Long algebraic form: `<source><target>[promotion]`, e.g. `e2e4`,
    /// `a7a8q`. Castling renders as the king's two-square hop (`e1g1`).
    pub fn to_long_algebraic(&self) -> String {
        let mut s = format!("{}{}", self.from.to_algebraic(), self.to.to_algebraic());
        if let Some(promoted) = self.promotion() {
            s.push(promoted.to_char());
        }
        s
    }

    pub fn to_human(&self) -> String {
        if let MoveFlag::CastleKingside = self.flag {
            return format!("{} castles kingside", self.piece.color.to_human());
        }
        if let MoveFlag::CastleQueenside = self.flag {
            return format!("{} castles queenside", self.piece.color.to_human());
        }
        let maybe_capture_str = match self.captured {
            Some(taken) => format!(" capturing {}", taken.to_human()),
            None => "".to_string(),
        };
        let maybe_promotion_str = match self.promotion() {
            Some(promoted) => format!(" promoting to {}", promoted.to_human()),
            None => "".to_string(),
        };
        format!(
            "{} moves {} from {} to {}{}{}",
            self.piece.color.to_human(),
            self.piece.piece_type.to_human(),
            self.from.to_algebraic(),
            self.to.to_algebraic(),
            maybe_capture_str,
            maybe_promotion_str,
        )
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.piece == other.piece
            && self.promotion() == other.promotion()
    }
}

impl Eq for Move {}

/// Information needed to undo a move. Produced by `Board::make_move`, consumed
/// by `Board::unmake_move`. Every exit path that applied a move must feed the
/// token back, including early returns after pruning.
#[derive(Debug, Clone)]
#[must_use = "an applied move must be undone by passing this token to unmake_move"]
pub struct UndoInfo {
    /// The move that was made
    pub(crate) mv: Move,
    /// The captured piece and the square it stood on (differs from the move
    /// target for en-passant captures)
    pub(crate) captured: Option<(PieceType, Square)>,
    /// Previous castling rights
    pub(crate) castle_kingside_white: bool,
    pub(crate) castle_queenside_white: bool,
    pub(crate) castle_kingside_black: bool,
    pub(crate) castle_queenside_black: bool,
    /// Previous en passant target
    pub(crate) en_passant_target: Option<Square>,
    /// Previous halfmove clock
    pub(crate) halfmove_clock: u32,
    /// Previous Zobrist hash
    pub(crate) zobrist_hash: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_from_algebraic() {
        assert_eq!(Square::from_algebraic("a1").unwrap(), Square(0));
        assert_eq!(Square::from_algebraic("h1").unwrap(), Square(7));
        assert_eq!(Square::from_algebraic("a8").unwrap(), Square(56));
        assert_eq!(Square::from_algebraic("h8").unwrap(), Square(63));
        assert_eq!(Square::from_algebraic("e4").unwrap(), Square(28));
    }

    #[test]
    fn test_square_from_algebraic_rejects_garbage() {
        for s in ["", "e", "e44", "i4", "a9", "4e", "zz"] {
            assert!(Square::from_algebraic(s).is_err(), "accepted {s:?}");
        }
    }

    #[test]
    fn test_square_round_trip() {
        for idx in 0..64u8 {
            let sq = Square(idx);
            assert_eq!(Square::from_algebraic(&sq.to_algebraic()).unwrap(), sq);
        }
    }

    #[test]
    fn test_square_file_rank_mask() {
        let e4 = Square::from_algebraic("e4").unwrap();
        assert_eq!(e4.file(), 4);
        assert_eq!(e4.rank(), 3);
        assert_eq!(e4.bb(), 1u64 << 28);
    }

    #[test]
    fn test_shift_edge_detection() {
        let a1 = Square::from_algebraic("a1").unwrap();
        assert_eq!(a1.shift(Direction::South), None);
        assert_eq!(a1.shift(Direction::West), None);
        assert_eq!(
            a1.shift(Direction::NorthEast),
            Some(Square::from_algebraic("b2").unwrap())
        );
        let h8 = Square::from_algebraic("h8").unwrap();
        assert_eq!(h8.shift(Direction::NorthNorthEast), None);
        assert_eq!(
            h8.shift(Direction::SouthSouthWest),
            Some(Square::from_algebraic("g6").unwrap())
        );
    }

    #[test]
    fn test_direction_kinds() {
        assert_eq!(Direction::North.kind(), DirectionKind::Orthogonal);
        assert_eq!(Direction::SouthWest.kind(), DirectionKind::Diagonal);
        assert_eq!(Direction::EastNorthEast.kind(), DirectionKind::Knight);
    }

    #[test]
    fn test_color_from_char() {
        assert_eq!(Color::from_char('w').unwrap(), Color::White);
        assert_eq!(Color::from_char('b').unwrap(), Color::Black);
        assert!(Color::from_char('x').is_err());
    }

    #[test]
    fn test_piece_symbols() {
        let wk = Piece::new(Color::White, PieceType::King);
        assert_eq!(wk.to_char(), 'K');
        let bq = Piece::new(Color::Black, PieceType::Queen);
        assert_eq!(bq.to_char(), 'q');
        assert_eq!(Piece::from_char('N').unwrap(), Piece::new(Color::White, PieceType::Knight));
    }

    #[test]
    fn test_move_equality_ignores_capture_annotation() {
        let piece = Piece::new(Color::White, PieceType::Rook);
        let from = Square::from_algebraic("a1").unwrap();
        let to = Square::from_algebraic("a8").unwrap();
        let quiet = Move::new(piece, from, to, None);
        let capture = Move::new(piece, from, to, Some(PieceType::Rook));
        assert_eq!(quiet, capture);
    }

    #[test]
    fn test_move_equality_distinguishes_promotions() {
        let pawn = Piece::new(Color::White, PieceType::Pawn);
        let from = Square::from_algebraic("a7").unwrap();
        let to = Square::from_algebraic("a8").unwrap();
        let mut queen = Move::new(pawn, from, to, None);
        queen.flag = MoveFlag::Promotion(PieceType::Queen);
        let mut knight = Move::new(pawn, from, to, None);
        knight.flag = MoveFlag::Promotion(PieceType::Knight);
        assert_ne!(queen, knight);
    }

    #[test]
    fn test_long_algebraic() {
        let pawn = Piece::new(Color::Black, PieceType::Pawn);
        let mut mv = Move::new(
            pawn,
            Square::from_algebraic("a2").unwrap(),
            Square::from_algebraic("a1").unwrap(),
            None,
        );
        mv.flag = MoveFlag::Promotion(PieceType::Queen);
        assert_eq!(mv.to_long_algebraic(), "a2a1q");
    }
}
